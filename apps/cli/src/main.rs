use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use console::style;
use storyboard_core::{
    Collaborators, JsonDeckSink, PipelineConfig, Provider, Session, format_time_range,
    get_root_cache_dir,
};
use tracing::info;

use crate::progress::{StatusWatcher, create_spinner};

mod progress;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Flash,
    Pro,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Flash => Provider::GeminiFlash,
            CliProvider::Pro => Provider::GeminiPro,
        }
    }
}

/// `SEGMENT=FRAME`, both 1-based.
fn parse_pick(s: &str) -> Result<(usize, usize), String> {
    let (segment, frame) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SEGMENT=FRAME, got '{s}'"))?;
    let segment: usize = segment
        .trim()
        .parse()
        .map_err(|_| format!("invalid segment number '{segment}'"))?;
    let frame: usize = frame
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame number '{frame}'"))?;
    if segment == 0 || frame == 0 {
        return Err("segment and frame numbers start at 1".to_string());
    }
    Ok((segment, frame))
}

#[derive(Parser)]
#[command(name = "storyboard")]
#[command(
    about = "Turn a video into a storyboard of transcribed, illustrated segments and export it as a deck"
)]
struct Cli {
    /// Video file
    video: PathBuf,

    /// Gemini model used for analysis
    #[arg(short, long, default_value = "flash")]
    provider: CliProvider,

    /// Directory the deck is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Seconds to wait for a single frame before using a blank one
    #[arg(long, default_value_t = 10)]
    seek_timeout: u64,

    /// Re-run analysis even if a cached result exists
    #[arg(short, long)]
    force: bool,

    /// Replace a segment's screenshot with one of its alternate frames (e.g. 3=7)
    #[arg(long = "pick", value_name = "SEGMENT=FRAME", value_parser = parse_pick)]
    picks: Vec<(usize, usize)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig {
        provider: cli.provider.into(),
        seek_timeout: Duration::from_secs(cli.seek_timeout),
        ..PipelineConfig::default()
    };

    // Validate API key early
    if let Err(e) = config.provider.validate_api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e.cause());
        std::process::exit(1);
    }

    if !cli.video.is_file() {
        bail!("Video file not found: {}", cli.video.display());
    }

    println!(
        "\n{}  {}\n",
        style("storyboard").cyan().bold(),
        style("Video Teardown").dim()
    );
    println!(
        "{} Analyzing with {}",
        style("✓").green().bold(),
        style(config.provider.name()).yellow()
    );

    let collaborators = Collaborators::cached(&config, get_root_cache_dir(), cli.force);
    let mut session = Session::new(config, collaborators);

    let total_start = Instant::now();

    // Step 1: load, analyze, capture
    let watcher = StatusWatcher::spawn(session.subscribe());
    let processed = session.process(&cli.video).await;
    watcher.finish();

    if let Err(e) = processed {
        eprintln!("{} {}", style("✗").red().bold(), session.status().message);
        return Err(e.into());
    }
    println!(
        "{} {} {} {}",
        style("✓").green().bold(),
        session.status().message,
        style(format!("{} segments", session.items().len())).yellow(),
        style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
    );

    println!("{}", style("─".repeat(60)).dim());
    for (i, item) in session.items().iter().enumerate() {
        let frame = if item.visible_screenshot().is_some() {
            style("frame").green()
        } else {
            style("no frame").red()
        };
        println!(
            "{:>3}. {} {}  {}",
            i + 1,
            style(format_time_range(item.start_time, item.end_time)).cyan(),
            style(format!("[{}]", frame)).dim(),
            item.script
        );
        println!("     {}", style(&item.description).dim());
    }
    println!("{}", style("─".repeat(60)).dim());

    // Step 2: alternate frames
    for (segment, frame) in &cli.picks {
        let Some(id) = session.item(*segment).map(|item| item.id) else {
            bail!(
                "No segment {} (storyboard has {})",
                segment,
                session.items().len()
            );
        };

        let step_start = Instant::now();
        let spinner = create_spinner(&format!("Scrubbing segment {}...", segment));
        let alternates = session.scrub(id).await?;
        let chosen = alternates
            .get(frame - 1)
            .with_context(|| format!("Segment {} has only {} frames", segment, alternates.len()))?;
        info!(segment, frame, timestamp = chosen.timestamp, "selected alternate frame");
        session.select_frame(id, chosen.image.clone())?;
        spinner.finish_with_message(format!(
            "{} Segment {} now uses the frame at {:.2}s {}",
            style("✓").green().bold(),
            segment,
            chosen.timestamp,
            style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
        ));
    }

    // Step 3: export
    if session.items().is_empty() {
        println!(
            "{} No segments found, nothing to export",
            style("!").yellow().bold()
        );
        return Ok(());
    }

    let step_start = Instant::now();
    let mut sink = JsonDeckSink::new(&cli.output);
    let watcher = StatusWatcher::spawn(session.subscribe());
    let exported = session.export(&mut sink).await;
    watcher.finish();

    let deck_path = match exported {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{} {}", style("✗").red().bold(), session.status().message);
            return Err(e.into());
        }
    };
    println!(
        "{} {} {}",
        style("✓").green().bold(),
        session.status().message,
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    );

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!(
        "{} {}\n",
        style("Saved:").dim(),
        style(deck_path.display()).cyan()
    );

    Ok(())
}
