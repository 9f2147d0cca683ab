use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::{
    error::MediaError,
    types::{VideoDimensions, VideoMetadata},
};

/// Reads pixel dimensions and duration from a video file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<VideoMetadata, MediaError>;
}

pub struct FfprobeProbe {
    ffprobe_bin: PathBuf,
}

impl FfprobeProbe {
    pub fn new(ffprobe_bin: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
        }
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<VideoMetadata, MediaError> {
        let output = Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| MediaError::ProbeFailed {
                path: path.to_path_buf(),
                reason: format!("could not run {}: {}", self.ffprobe_bin.display(), e),
            })?;

        if !output.status.success() {
            return Err(MediaError::ProbeFailed {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let metadata = parse_ffprobe_output(&String::from_utf8_lossy(&output.stdout), path)?;
        debug!(
            width = metadata.dimensions.width,
            height = metadata.dimensions.height,
            duration = metadata.duration,
            "probed {}",
            path.display()
        );
        Ok(metadata)
    }
}

pub fn parse_ffprobe_output(json: &str, path: &Path) -> Result<VideoMetadata, MediaError> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| MediaError::ProbeFailed {
            path: path.to_path_buf(),
            reason: format!("unreadable ffprobe output: {e}"),
        })?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| MediaError::NoVideoStream {
            path: path.to_path_buf(),
        })?;

    let (Some(width), Some(height)) = (video_stream.width, video_stream.height) else {
        return Err(MediaError::ProbeFailed {
            path: path.to_path_buf(),
            reason: "video stream has no dimensions".to_string(),
        });
    };

    // Prefer the container duration; some streams do not carry their own.
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(video_stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    Ok(VideoMetadata {
        dimensions: VideoDimensions { width, height },
        duration,
    })
}
