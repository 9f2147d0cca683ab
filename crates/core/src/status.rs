//! Pipeline stages, their progress bands, and the controller that owns the
//! current [`ProcessingStatus`].

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{Result, StoryboardError},
    queues::{Latest1Queue, Latest1Receiver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Idle,
    Uploading,
    Analyzing,
    Capturing,
    Complete,
    Exporting,
    Error,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::Uploading => "uploading",
            Step::Analyzing => "analyzing",
            Step::Capturing => "capturing",
            Step::Complete => "complete",
            Step::Exporting => "exporting",
            Step::Error => "error",
        }
    }

    /// Forward edges of the pipeline. `Error` is reachable from anywhere,
    /// `Idle` only from the two resting states.
    pub fn can_transition_to(&self, next: Step) -> bool {
        use Step::*;
        matches!(
            (self, next),
            (_, Error)
                | (Idle, Uploading)
                | (Uploading, Analyzing)
                | (Analyzing, Capturing)
                | (Capturing, Complete)
                | (Complete, Exporting)
                | (Exporting, Complete)
                | (Complete, Idle)
                | (Error, Idle)
        )
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Step::Uploading | Step::Analyzing | Step::Capturing | Step::Exporting
        )
    }

    pub fn band(&self) -> PhaseBand {
        PHASE_BANDS
            .iter()
            .copied()
            .find(|band| band.step == *self)
            .unwrap_or(PhaseBand::flat(*self, 0))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress range a stage reports into: `start` on entry, rising towards `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBand {
    pub step: Step,
    pub start: u8,
    pub end: u8,
}

impl PhaseBand {
    const fn new(step: Step, start: u8, end: u8) -> Self {
        Self { step, start, end }
    }

    const fn flat(step: Step, at: u8) -> Self {
        Self::new(step, at, at)
    }

    /// `start + floor(done / total * (end - start))`, integer exact.
    pub fn at(&self, done: usize, total: usize) -> u8 {
        if total == 0 {
            return self.start;
        }
        let span = (self.end - self.start) as usize;
        let done = done.min(total);
        self.start + (span * done / total) as u8
    }
}

pub const PHASE_BANDS: [PhaseBand; 7] = [
    PhaseBand::flat(Step::Idle, 0),
    PhaseBand::flat(Step::Uploading, 10),
    PhaseBand::flat(Step::Analyzing, 40),
    PhaseBand::new(Step::Capturing, 70, 95),
    PhaseBand::flat(Step::Complete, 100),
    PhaseBand::new(Step::Exporting, 0, 100),
    PhaseBand::flat(Step::Error, 0),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    pub step: Step,
    pub progress: u8,
    pub message: String,
}

impl ProcessingStatus {
    pub fn idle() -> Self {
        Self {
            step: Step::Idle,
            progress: 0,
            message: String::new(),
        }
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Owns the current status and publishes every replacement to observers.
pub struct StatusController {
    current: ProcessingStatus,
    snapshots: Arc<Latest1Queue<ProcessingStatus>>,
}

impl StatusController {
    pub fn new() -> Self {
        let snapshots = Latest1Queue::new();
        snapshots.set(ProcessingStatus::idle());
        Self {
            current: ProcessingStatus::idle(),
            snapshots,
        }
    }

    pub fn current(&self) -> &ProcessingStatus {
        &self.current
    }

    pub fn step(&self) -> Step {
        self.current.step
    }

    pub fn subscribe(&self) -> Latest1Receiver<ProcessingStatus> {
        self.snapshots.subscribe()
    }

    /// Enter `next` at the start of its band.
    pub fn enter(&mut self, next: Step, message: impl Into<String>) -> Result<()> {
        let from = self.current.step;
        if !from.can_transition_to(next) {
            return Err(StoryboardError::InvalidTransition { from, to: next });
        }
        let message = message.into();
        info!(from = %from, to = %next, "{}", message);
        self.replace(ProcessingStatus {
            step: next,
            progress: next.band().start,
            message,
        });
        Ok(())
    }

    /// Report `done` of `total` units inside the current stage's band.
    pub fn advance(&mut self, done: usize, total: usize, message: impl Into<String>) {
        let step = self.current.step;
        self.replace(ProcessingStatus {
            step,
            progress: step.band().at(done, total),
            message: message.into(),
        });
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.replace(ProcessingStatus {
            step: Step::Error,
            progress: 0,
            message: message.into(),
        });
    }

    /// Back to `complete` after a failed export, keeping the storyboard browsable.
    pub fn recover(&mut self, message: impl Into<String>) {
        self.replace(ProcessingStatus {
            step: Step::Complete,
            progress: 100,
            message: message.into(),
        });
    }

    pub fn reset(&mut self) -> Result<()> {
        if self.current.step == Step::Idle {
            return Ok(());
        }
        self.enter(Step::Idle, "")
    }

    fn replace(&mut self, status: ProcessingStatus) {
        debug!(step = %status.step, progress = status.progress, "{}", status.message);
        self.current = status.clone();
        self.snapshots.set(status);
    }
}

impl Default for StatusController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StatusController {
    fn drop(&mut self) {
        self.snapshots.close();
    }
}
