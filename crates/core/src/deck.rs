use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::DeckError,
    format::deck_file_name,
    layout::{DeckGeometry, Slide, compose_slide},
    types::{StoryboardItem, VideoDimensions},
};

/// Slide-deck serializer. Receives slides one at a time, in order, then a
/// file name, and produces a single deck file.
#[async_trait]
pub trait DeckSink: Send {
    fn extension(&self) -> &'static str;

    async fn add_slide(&mut self, slide: Slide) -> Result<(), DeckError>;

    async fn finish(&mut self, file_name: &str) -> Result<PathBuf, DeckError>;
}

/// Writes the deck as a JSON document of draw instructions.
pub struct JsonDeckSink {
    output_dir: PathBuf,
    slides: Vec<Slide>,
    finished: bool,
}

#[derive(Serialize)]
struct JsonDeck<'a> {
    layout: &'static str,
    slides: &'a [Slide],
}

impl JsonDeckSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            slides: Vec::new(),
            finished: false,
        }
    }
}

#[async_trait]
impl DeckSink for JsonDeckSink {
    fn extension(&self) -> &'static str {
        "deck.json"
    }

    async fn add_slide(&mut self, slide: Slide) -> Result<(), DeckError> {
        if self.finished {
            return Err(DeckError::AlreadyFinished);
        }
        self.slides.push(slide);
        Ok(())
    }

    async fn finish(&mut self, file_name: &str) -> Result<PathBuf, DeckError> {
        if self.finished {
            return Err(DeckError::AlreadyFinished);
        }
        let path = self.output_dir.join(file_name);
        let json = serde_json::to_vec_pretty(&JsonDeck {
            layout: "16x9",
            slides: &self.slides,
        })?;

        fs::create_dir_all(&self.output_dir).await?;
        fs::write(&path, json)
            .await
            .map_err(|e| DeckError::WriteFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        self.finished = true;
        Ok(path)
    }
}

/// Lay out and emit one slide per item, yielding to the runtime between
/// slides. `on_slide(done, total)` fires after each emitted slide.
pub async fn export_deck(
    items: &[StoryboardItem],
    video: VideoDimensions,
    geometry: &DeckGeometry,
    video_name: Option<&str>,
    sink: &mut dyn DeckSink,
    mut on_slide: impl FnMut(usize, usize),
) -> Result<PathBuf, DeckError> {
    let total = items.len();
    let image_rect = geometry.fit_image(video);
    debug!(?image_rect, slides = total, "deck layout computed");

    for (i, item) in items.iter().enumerate() {
        sink.add_slide(compose_slide(i + 1, item, image_rect)).await?;
        on_slide(i + 1, total);
        tokio::task::yield_now().await;
    }

    let file_name = deck_file_name(video_name, sink.extension());
    let path = sink.finish(&file_name).await?;
    info!(slides = total, "deck written to {}", path.display());
    Ok(path)
}
