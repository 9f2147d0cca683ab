use std::path::PathBuf;
use thiserror::Error;

use crate::status::Step;

#[derive(Error, Debug)]
pub enum StoryboardError {
    #[error("Could not read video file {path}: {reason}")]
    UploadFailed { path: PathBuf, reason: String },

    #[error("{0}")]
    Analyzer(#[from] AnalyzerError),

    #[error("{0}")]
    Media(#[from] MediaError),

    #[error("Failed to generate deck: {0}")]
    Deck(#[from] DeckError),

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: Step, to: Step },

    #[error("Storyboard is empty, nothing to export")]
    EmptyStoryboard,

    #[error("No storyboard item with id {id}")]
    UnknownItem { id: uuid::Uuid },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Failures of the external analyzer. Every variant renders as the same
/// user-facing sentence; [`AnalyzerError::cause`] carries the detail.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Failed to analyze video. Ensure the file is valid and accessible.")]
    MissingApiKey { env_var: String },

    #[error("Failed to analyze video. Ensure the file is valid and accessible.")]
    Http(#[from] reqwest::Error),

    #[error("Failed to analyze video. Ensure the file is valid and accessible.")]
    InvalidResponse { reason: String },

    #[error("Failed to analyze video. Ensure the file is valid and accessible.")]
    Json(#[from] serde_json::Error),

    #[error("Failed to analyze video. Ensure the file is valid and accessible.")]
    InvalidSegment { index: usize, reason: String },
}

impl AnalyzerError {
    /// The underlying cause, for logging.
    pub fn cause(&self) -> String {
        match self {
            AnalyzerError::MissingApiKey { env_var } => {
                format!("Missing API key: {env_var} environment variable is not set")
            }
            AnalyzerError::Http(e) => e.to_string(),
            AnalyzerError::InvalidResponse { reason } => reason.clone(),
            AnalyzerError::Json(e) => e.to_string(),
            AnalyzerError::InvalidSegment { index, reason } => format!("segment {index}: {reason}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Video could not be loaded from {path}. Ensure the file is a valid video.")]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("No video stream found in {path}")]
    NoVideoStream { path: PathBuf },

    #[error("Frame capture at {timestamp:.3}s failed: {reason}")]
    GrabFailed { timestamp: f64, reason: String },
}

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to write deck {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Deck already finished")]
    AlreadyFinished,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoryboardError>;
