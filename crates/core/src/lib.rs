//! Turns a video into an editable storyboard: one item per spoken segment,
//! each with its transcript, a description of the action and a frame from
//! the middle of the segment. The storyboard can be exported as a deck.

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod deck;
pub mod error;
pub mod format;
pub mod layout;
pub mod materializer;
pub mod media;
pub mod provider;
pub mod queues;
pub mod scrubber;
pub mod session;
pub mod status;
pub mod store;
pub mod types;

pub use analyzer::{Analyzer, GeminiAnalyzer};
pub use cache::{CachedAnalyzer, get_cache_dir_in, get_root_cache_dir, get_segments_path};
pub use config::PipelineConfig;
pub use deck::{DeckSink, JsonDeckSink, export_deck};
pub use error::{AnalyzerError, DeckError, MediaError, Result, StoryboardError};
pub use format::{deck_file_name, format_time_range, format_timestamp};
pub use layout::{DeckGeometry, Rect, Slide};
pub use media::{FrameGrabber, FrameSampler, MediaProbe, VideoHandle, VideoSource};
pub use provider::{Provider, ProviderConfig};
pub use scrubber::AlternateFrame;
pub use session::{Collaborators, Session};
pub use status::{ProcessingStatus, Step};
pub use store::StoryboardStore;
pub use types::{
    EncodedImage, ItemUpdate, Segment, StoryboardItem, VideoDimensions, VideoMetadata,
};
