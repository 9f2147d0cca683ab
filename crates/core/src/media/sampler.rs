use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    config::PipelineConfig,
    media::{FrameGrabber, VideoLease},
    types::EncodedImage,
};

/// Seek-and-capture with a bounded wait. Never fails: anything that keeps a
/// frame from being produced yields [`EncodedImage::blank`].
#[derive(Clone)]
pub struct FrameSampler {
    grabber: Arc<dyn FrameGrabber>,
    seek_timeout: Duration,
    quality: f64,
}

impl FrameSampler {
    pub fn new(grabber: Arc<dyn FrameGrabber>, seek_timeout: Duration, quality: f64) -> Self {
        Self {
            grabber,
            seek_timeout,
            quality,
        }
    }

    pub fn from_config(grabber: Arc<dyn FrameGrabber>, config: &PipelineConfig) -> Self {
        Self::new(grabber, config.seek_timeout, config.jpeg_quality)
    }

    pub async fn sample(&self, lease: &mut VideoLease<'_>, timestamp: f64) -> EncodedImage {
        if lease.source().is_none() {
            debug!("no video loaded, returning blank frame for {timestamp:.3}s");
            return EncodedImage::blank();
        }

        let target = lease.seek(timestamp);
        let Some(source) = lease.source() else {
            return EncodedImage::blank();
        };

        match tokio::time::timeout(
            self.seek_timeout,
            self.grabber.grab(source, target, self.quality),
        )
        .await
        {
            Ok(Ok(image)) => {
                debug!(timestamp = target, bytes = image.data.len(), "captured frame");
                image
            }
            Ok(Err(e)) => {
                warn!(timestamp = target, "frame capture failed, using blank frame: {e}");
                EncodedImage::blank()
            }
            Err(_) => {
                warn!(
                    timestamp = target,
                    timeout_ms = self.seek_timeout.as_millis() as u64,
                    "seek did not settle, using blank frame"
                );
                EncodedImage::blank()
            }
        }
    }
}
