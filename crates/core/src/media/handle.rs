use std::{path::PathBuf, sync::Arc};

use tokio::sync::{Mutex, MutexGuard};

use crate::types::{VideoDimensions, VideoMetadata};

/// A decodable video file together with its probed metadata.
#[derive(Debug, Clone)]
pub struct VideoSource {
    pub path: PathBuf,
    pub metadata: VideoMetadata,
}

impl VideoSource {
    pub fn dimensions(&self) -> VideoDimensions {
        self.metadata.dimensions
    }

    pub fn duration(&self) -> f64 {
        self.metadata.duration
    }
}

#[derive(Debug, Default)]
struct Playback {
    source: Option<VideoSource>,
    position: f64,
}

/// The session's single playback resource. All sampling goes through a
/// [`VideoLease`], and only one lease exists at a time.
#[derive(Debug, Clone, Default)]
pub struct VideoHandle {
    playback: Arc<Mutex<Playback>>,
}

impl VideoHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, source: VideoSource) {
        let mut playback = self.playback.lock().await;
        playback.source = Some(source);
        playback.position = 0.0;
    }

    pub async fn unload(&self) {
        let mut playback = self.playback.lock().await;
        playback.source = None;
        playback.position = 0.0;
    }

    /// Wait until no other stage is sampling, then take exclusive use.
    pub async fn acquire(&self) -> VideoLease<'_> {
        VideoLease {
            playback: self.playback.lock().await,
        }
    }

    #[cfg(test)]
    pub fn try_acquire(&self) -> Option<VideoLease<'_>> {
        self.playback
            .try_lock()
            .ok()
            .map(|playback| VideoLease { playback })
    }
}

pub struct VideoLease<'a> {
    playback: MutexGuard<'a, Playback>,
}

impl VideoLease<'_> {
    pub fn source(&self) -> Option<&VideoSource> {
        self.playback.source.as_ref()
    }

    pub fn position(&self) -> f64 {
        self.playback.position
    }

    /// Move the playhead, clamped to the loaded video's duration.
    pub fn seek(&mut self, timestamp: f64) -> f64 {
        let duration = self.source().map(VideoSource::duration).unwrap_or(0.0);
        let target = clamp_timestamp(timestamp, duration);
        self.playback.position = target;
        target
    }
}

/// Clamp into `[0, duration]`. A duration that is not a positive finite
/// number means unknown, and only the lower bound applies.
pub fn clamp_timestamp(timestamp: f64, duration: f64) -> f64 {
    if timestamp.is_nan() {
        return 0.0;
    }
    if duration.is_finite() && duration > 0.0 {
        timestamp.clamp(0.0, duration)
    } else {
        timestamp.max(0.0)
    }
}
