use tracing::{info, warn};

use crate::{
    media::{FrameSampler, VideoLease},
    types::{Segment, StoryboardItem},
};

/// Attach a midpoint frame to every segment, strictly in input order.
///
/// `on_item(index, total)` fires after each item with its 0-based index.
/// A blank frame does not stop the run; the item keeps a blank screenshot.
pub async fn materialize(
    segments: Vec<Segment>,
    lease: &mut VideoLease<'_>,
    sampler: &FrameSampler,
    mut on_item: impl FnMut(usize, usize),
) -> Vec<StoryboardItem> {
    let total = segments.len();
    let mut items = Vec::with_capacity(total);

    for (index, segment) in segments.into_iter().enumerate() {
        let screenshot = sampler.sample(lease, segment.midpoint()).await;
        if screenshot.is_blank() {
            warn!(
                segment = index + 1,
                start = segment.start_time,
                end = segment.end_time,
                "segment has no screenshot"
            );
        }
        items.push(StoryboardItem::from_segment(segment, screenshot));
        on_item(index, total);
    }

    info!(items = items.len(), "storyboard materialized");
    items
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        path::PathBuf,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        error::MediaError,
        media::{FrameGrabber, VideoHandle, VideoSource},
        types::{EncodedImage, VideoDimensions, VideoMetadata},
    };

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl FrameGrabber for Recording {
        async fn grab(
            &self,
            _source: &VideoSource,
            timestamp: f64,
            _quality: f64,
        ) -> Result<EncodedImage, MediaError> {
            self.seen.lock().unwrap().push(timestamp);
            Ok(EncodedImage::jpeg(timestamp.to_string().into_bytes()))
        }
    }

    fn seg(start: f64, end: f64, script: &str) -> Segment {
        Segment {
            start_time: start,
            end_time: end,
            script: script.into(),
            description: format!("{script} visuals"),
        }
    }

    async fn setup() -> (Arc<Recording>, FrameSampler, VideoHandle) {
        let grabber = Arc::new(Recording::default());
        let sampler = FrameSampler::new(grabber.clone(), Duration::from_secs(1), 0.9);
        let handle = VideoHandle::new();
        handle
            .load(VideoSource {
                path: PathBuf::from("talk.mp4"),
                metadata: VideoMetadata {
                    dimensions: VideoDimensions {
                        width: 1920,
                        height: 1080,
                    },
                    duration: 60.0,
                },
            })
            .await;
        (grabber, sampler, handle)
    }

    #[tokio::test]
    async fn test_items_keep_order_and_get_unique_ids() {
        let (grabber, sampler, handle) = setup().await;
        let mut lease = handle.acquire().await;
        let segments = vec![seg(0.0, 5.0, "a"), seg(5.0, 12.0, "b"), seg(12.0, 20.0, "c")];

        let mut progress = Vec::new();
        let items = materialize(segments, &mut lease, &sampler, |i, n| progress.push((i, n))).await;

        assert_eq!(items.len(), 3);
        let scripts: Vec<_> = items.iter().map(|i| i.script.as_str()).collect();
        assert_eq!(scripts, vec!["a", "b", "c"]);
        let ids: HashSet<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(*grabber.seen.lock().unwrap(), vec![2.5, 8.5, 16.0]);
        assert_eq!(progress, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_midpoint_of_ten_to_twenty_is_fifteen() {
        let (grabber, sampler, handle) = setup().await;
        let mut lease = handle.acquire().await;

        materialize(vec![seg(10.0, 20.0, "x")], &mut lease, &sampler, |_, _| {}).await;

        assert_eq!(*grabber.seen.lock().unwrap(), vec![15.0]);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_storyboard() {
        let (_, sampler, handle) = setup().await;
        let mut lease = handle.acquire().await;
        let mut calls = 0;

        let items = materialize(Vec::new(), &mut lease, &sampler, |_, _| calls += 1).await;

        assert!(items.is_empty());
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_unsorted_input_is_not_reordered() {
        let (grabber, sampler, handle) = setup().await;
        let mut lease = handle.acquire().await;
        let segments = vec![seg(20.0, 30.0, "late"), seg(0.0, 10.0, "early")];

        let items = materialize(segments, &mut lease, &sampler, |_, _| {}).await;

        assert_eq!(items[0].script, "late");
        assert_eq!(*grabber.seen.lock().unwrap(), vec![25.0, 5.0]);
    }
}
