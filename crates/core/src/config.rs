use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// Number of alternate frames offered when scrubbing a segment.
pub const DEFAULT_SCRUB_FRAMES: usize = 15;

/// Lossy encoder quality in `0.0..=1.0`.
pub const DEFAULT_JPEG_QUALITY: f64 = 0.9;

pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    /// Upper bound on one seek-and-capture before falling back to a blank frame.
    #[serde(with = "duration_secs")]
    pub seek_timeout: Duration,
    pub jpeg_quality: f64,
    pub scrub_frames: usize,
    pub provider: Provider,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            scrub_frames: DEFAULT_SCRUB_FRAMES,
            provider: Provider::default(),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"seek_timeout": 2.5, "provider": "gemini-pro"}"#).unwrap();
        assert_eq!(cfg.seek_timeout, Duration::from_millis(2500));
        assert_eq!(cfg.provider, Provider::GeminiPro);
        assert_eq!(cfg.scrub_frames, DEFAULT_SCRUB_FRAMES);
        assert_eq!(cfg.ffmpeg_bin, PathBuf::from("ffmpeg"));
    }
}
