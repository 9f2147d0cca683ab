use tracing::debug;

use crate::{
    media::{FrameSampler, VideoLease},
    types::EncodedImage,
};

/// One alternate frame offered for a segment.
#[derive(Debug, Clone)]
pub struct AlternateFrame {
    pub timestamp: f64,
    pub image: EncodedImage,
}

/// `count` timestamps from `start` in steps of `(end - start) / (count - 1)`.
///
/// With the default 15 the step is a fourteenth of the span, so the last
/// sample lands at `end` only up to float rounding.
pub fn scrub_timestamps(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Sample the alternates for one segment. The result is not stored anywhere;
/// the caller picks one and writes it back through the store.
pub async fn scrub(
    lease: &mut VideoLease<'_>,
    sampler: &FrameSampler,
    start: f64,
    end: f64,
    count: usize,
) -> Vec<AlternateFrame> {
    let mut frames = Vec::with_capacity(count);
    for timestamp in scrub_timestamps(start, end, count) {
        let image = sampler.sample(lease, timestamp).await;
        frames.push(AlternateFrame { timestamp, image });
    }
    debug!(start, end, frames = frames.len(), "scrubbed segment");
    frames
}
