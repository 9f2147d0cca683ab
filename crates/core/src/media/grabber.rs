use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::{error::MediaError, media::VideoSource, types::EncodedImage};

/// Rasterizes the frame displayed at `timestamp` into a lossy still image at
/// the video's native resolution.
#[async_trait]
pub trait FrameGrabber: Send + Sync {
    async fn grab(
        &self,
        source: &VideoSource,
        timestamp: f64,
        quality: f64,
    ) -> Result<EncodedImage, MediaError>;
}

pub struct FfmpegFrameGrabber {
    ffmpeg_bin: PathBuf,
}

impl FfmpegFrameGrabber {
    pub fn new(ffmpeg_bin: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }
}

/// Map a `0.0..=1.0` quality onto ffmpeg's mjpeg qscale (2 best, 31 worst).
pub fn quality_to_qscale(quality: f64) -> u8 {
    let quality = if quality.is_finite() { quality.clamp(0.0, 1.0) } else { 0.9 };
    (2.0 + ((1.0 - quality) * 29.0).round()) as u8
}

#[async_trait]
impl FrameGrabber for FfmpegFrameGrabber {
    async fn grab(
        &self,
        source: &VideoSource,
        timestamp: f64,
        quality: f64,
    ) -> Result<EncodedImage, MediaError> {
        // Dropping the future (sampler timeout) kills the child.
        let output = Command::new(&self.ffmpeg_bin)
            .args(["-hide_banner", "-loglevel", "error", "-ss"])
            .arg(format!("{timestamp:.3}"))
            .arg("-i")
            .arg(&source.path)
            .args(["-frames:v", "1", "-an", "-sn", "-dn"])
            .args(["-f", "image2pipe", "-vcodec", "mjpeg", "-q:v"])
            .arg(quality_to_qscale(quality).to_string())
            .arg("-")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MediaError::GrabFailed {
                timestamp,
                reason: format!("could not run {}: {}", self.ffmpeg_bin.display(), e),
            })?;

        if !output.status.success() {
            return Err(MediaError::GrabFailed {
                timestamp,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if output.stdout.is_empty() {
            return Err(MediaError::GrabFailed {
                timestamp,
                reason: "no frame decoded".to_string(),
            });
        }

        Ok(EncodedImage::jpeg(output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_to_qscale() {
        assert_eq!(quality_to_qscale(1.0), 2);
        assert_eq!(quality_to_qscale(0.9), 5);
        assert_eq!(quality_to_qscale(0.0), 31);
        assert_eq!(quality_to_qscale(7.0), 2);
    }
}
