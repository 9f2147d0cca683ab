use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use storyboard_core::{ProcessingStatus, queues::Latest1Receiver};
use tokio::task::JoinHandle;

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Mirrors status snapshots onto a progress bar while a session works.
pub struct StatusWatcher {
    bar: ProgressBar,
    task: JoinHandle<()>,
}

impl StatusWatcher {
    pub fn spawn(mut rx: Latest1Receiver<ProcessingStatus>) -> Self {
        let bar = create_bar();
        let task = tokio::spawn({
            let bar = bar.clone();
            async move {
                while let Some(status) = rx.recv().await {
                    bar.set_position(status.progress as u64);
                    bar.set_message(status.message);
                }
            }
        });
        Self { bar, task }
    }

    pub fn finish(self) {
        self.task.abort();
        self.bar.finish_and_clear();
    }
}
