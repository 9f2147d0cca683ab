//! One video, start to finish: load, analyze, capture, browse, export.
//!
//! A [`Session`] owns the storyboard, the status and the playback resource.
//! Every operation takes `&mut self`, so two pipeline runs can never
//! interleave on the same session.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::fs;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    analyzer::{Analyzer, GeminiAnalyzer, validate_segments},
    cache::CachedAnalyzer,
    config::PipelineConfig,
    deck::{DeckSink, export_deck},
    error::{Result, StoryboardError},
    layout::DeckGeometry,
    materializer::materialize,
    media::{
        FfmpegFrameGrabber, FfprobeProbe, FrameGrabber, FrameSampler, MediaProbe, VideoHandle,
        VideoSource,
    },
    queues::Latest1Receiver,
    scrubber::{AlternateFrame, scrub},
    status::{ProcessingStatus, StatusController, Step},
    store::StoryboardStore,
    types::{EncodedImage, ItemUpdate, StoryboardItem, VideoDimensions},
};

/// The external services a session talks to.
pub struct Collaborators {
    pub analyzer: Arc<dyn Analyzer>,
    pub probe: Arc<dyn MediaProbe>,
    pub grabber: Arc<dyn FrameGrabber>,
}

impl Collaborators {
    /// Gemini for analysis, ffprobe and ffmpeg for media access.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            analyzer: Arc::new(GeminiAnalyzer::new(config.provider)),
            probe: Arc::new(FfprobeProbe::new(config.ffprobe_bin.clone())),
            grabber: Arc::new(FfmpegFrameGrabber::new(config.ffmpeg_bin.clone())),
        }
    }

    /// Same as [`Collaborators::from_config`], with analyzer results cached
    /// under `cache_root`. `force` ignores existing entries.
    pub fn cached(config: &PipelineConfig, cache_root: PathBuf, force: bool) -> Self {
        Self {
            analyzer: Arc::new(CachedAnalyzer::new(
                GeminiAnalyzer::new(config.provider),
                config.provider,
                cache_root,
                force,
            )),
            ..Self::from_config(config)
        }
    }
}

pub struct Session {
    config: PipelineConfig,
    geometry: DeckGeometry,
    analyzer: Arc<dyn Analyzer>,
    probe: Arc<dyn MediaProbe>,
    sampler: FrameSampler,
    video: VideoHandle,
    store: StoryboardStore,
    status: StatusController,
    dimensions: Option<VideoDimensions>,
    video_name: Option<String>,
}

impl Session {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        let sampler = FrameSampler::from_config(collaborators.grabber, &config);
        Self {
            config,
            geometry: DeckGeometry::default(),
            analyzer: collaborators.analyzer,
            probe: collaborators.probe,
            sampler,
            video: VideoHandle::new(),
            store: StoryboardStore::new(),
            status: StatusController::new(),
            dimensions: None,
            video_name: None,
        }
    }

    pub fn status(&self) -> &ProcessingStatus {
        self.status.current()
    }

    pub fn subscribe(&self) -> Latest1Receiver<ProcessingStatus> {
        self.status.subscribe()
    }

    pub fn items(&self) -> &[StoryboardItem] {
        self.store.items()
    }

    pub fn item(&self, number: usize) -> Option<&StoryboardItem> {
        self.store.nth(number)
    }

    pub fn dimensions(&self) -> Option<VideoDimensions> {
        self.dimensions
    }

    /// Run the whole pipeline on `path`. Any failure leaves the session in
    /// the error state with an empty storyboard and is also returned.
    pub async fn process(&mut self, path: &Path) -> Result<()> {
        if matches!(self.status.step(), Step::Complete | Step::Error) {
            self.reset().await?;
        }
        if self.status.step().is_busy() {
            return Err(StoryboardError::InvalidTransition {
                from: self.status.step(),
                to: Step::Uploading,
            });
        }

        self.video_name = path.file_name().map(|name| name.to_string_lossy().into_owned());

        match self.run_pipeline(path).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if let StoryboardError::Analyzer(cause) = &e {
                    error!("analysis failed: {}", cause.cause());
                } else {
                    error!("processing {} failed: {}", path.display(), e);
                }
                self.store.reset();
                self.video.unload().await;
                self.dimensions = None;
                self.status.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_pipeline(&mut self, path: &Path) -> Result<()> {
        self.status.enter(Step::Uploading, "Loading video file...")?;
        let video = fs::read(path)
            .await
            .map_err(|e| StoryboardError::UploadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mime_type = mime_type_for(path);
        info!(bytes = video.len(), mime_type, "loaded {}", path.display());

        self.status.enter(
            Step::Analyzing,
            "AI is extracting script and describing action...",
        )?;
        let segments = self.analyzer.analyze(&video, mime_type).await?;
        drop(video);
        validate_segments(&segments)?;
        info!(segments = segments.len(), "analysis finished");

        self.status
            .enter(Step::Capturing, "Capturing midpoint visual context...")?;
        let metadata = self.probe.probe(path).await?;
        self.dimensions = Some(metadata.dimensions);
        self.video
            .load(VideoSource {
                path: path.to_path_buf(),
                metadata,
            })
            .await;

        let handle = self.video.clone();
        let mut lease = handle.acquire().await;
        let status = &mut self.status;
        let items = materialize(segments, &mut lease, &self.sampler, |index, total| {
            status.advance(
                index,
                total,
                format!("Captured visual for chapter {} of {}...", index + 1, total),
            );
        })
        .await;
        drop(lease);

        self.store.replace_all(items);
        self.status.enter(Step::Complete, "Teardown complete!")?;
        Ok(())
    }

    /// Alternate frames across item `id`'s span.
    pub async fn scrub(&mut self, id: Uuid) -> Result<Vec<AlternateFrame>> {
        self.require(Step::Complete)?;
        let (start, end) = self
            .store
            .get(id)
            .map(|item| (item.start_time, item.end_time))
            .ok_or(StoryboardError::UnknownItem { id })?;

        let mut lease = self.video.acquire().await;
        Ok(scrub(&mut lease, &self.sampler, start, end, self.config.scrub_frames).await)
    }

    /// Make `image` the screenshot of item `id`.
    pub fn select_frame(&mut self, id: Uuid, image: EncodedImage) -> Result<()> {
        self.update(id, ItemUpdate::screenshot(image))
    }

    pub fn update(&mut self, id: Uuid, update: ItemUpdate) -> Result<()> {
        if self.store.update(id, &update) {
            Ok(())
        } else {
            Err(StoryboardError::UnknownItem { id })
        }
    }

    /// Write the current storyboard to `sink`. A failed export returns the
    /// session to `complete` with the storyboard intact.
    pub async fn export(&mut self, sink: &mut dyn DeckSink) -> Result<PathBuf> {
        self.require(Step::Complete)?;
        if self.store.is_empty() {
            return Err(StoryboardError::EmptyStoryboard);
        }

        self.status
            .enter(Step::Exporting, "Generating professional deck...")?;
        let items = self.store.snapshot();
        let video = self.dimensions.unwrap_or_default();

        let status = &mut self.status;
        let result = export_deck(
            &items,
            video,
            &self.geometry,
            self.video_name.as_deref(),
            sink,
            |done, total| {
                status.advance(done, total, format!("Building slide {} of {}...", done, total));
            },
        )
        .await;

        match result {
            Ok(path) => {
                self.status.enter(Step::Complete, "Export Successful!")?;
                Ok(path)
            }
            Err(e) => {
                warn!("deck export failed: {}", e);
                self.status
                    .recover(format!("Failed to generate deck file: {}", e));
                Err(e.into())
            }
        }
    }

    /// Drop the storyboard and the loaded video and return to idle.
    pub async fn reset(&mut self) -> Result<()> {
        self.status.reset()?;
        self.store.reset();
        self.video.unload().await;
        self.dimensions = None;
        self.video_name = None;
        Ok(())
    }

    fn require(&self, step: Step) -> Result<()> {
        let from = self.status.step();
        if from == step {
            Ok(())
        } else {
            Err(StoryboardError::InvalidTransition { from, to: step })
        }
    }
}

/// Container mime type from the file extension, `video/mp4` when unknown.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("m4v") => "video/x-m4v",
        _ => "video/mp4",
    }
}
