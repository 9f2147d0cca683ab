use base64::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time span as delivered by the analyzer, before any frame is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_time: f64,
    pub end_time: f64,
    pub script: String,
    pub description: String,
}

impl Segment {
    pub fn midpoint(&self) -> f64 {
        self.start_time + (self.end_time - self.start_time) / 2.0
    }
}

/// An encoded still frame. Empty bytes are the sentinel for "no frame".
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl EncodedImage {
    pub const JPEG: &'static str = "image/jpeg";

    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: Self::JPEG.to_string(),
            data,
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_data_url(&self) -> String {
        if self.is_blank() {
            return String::new();
        }
        format!("data:{};base64,{}", self.mime_type, BASE64_STANDARD.encode(&self.data))
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::prelude::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64_STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardItem {
    pub id: Uuid,
    pub start_time: f64,
    pub end_time: f64,
    pub script: String,
    pub description: String,
    pub screenshot: Option<EncodedImage>,
}

impl StoryboardItem {
    pub fn from_segment(segment: Segment, screenshot: EncodedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: segment.start_time,
            end_time: segment.end_time,
            script: segment.script,
            description: segment.description,
            screenshot: Some(screenshot),
        }
    }

    /// Screenshot that can be placed on a slide, if any.
    pub fn visible_screenshot(&self) -> Option<&EncodedImage> {
        self.screenshot.as_ref().filter(|s| !s.is_blank())
    }
}

/// Partial update for a storyboard item; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub script: Option<String>,
    pub description: Option<String>,
    pub screenshot: Option<EncodedImage>,
}

impl ItemUpdate {
    pub fn script(script: impl Into<String>) -> Self {
        Self {
            script: Some(script.into()),
            ..Default::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn screenshot(screenshot: EncodedImage) -> Self {
        Self {
            screenshot: Some(screenshot),
            ..Default::default()
        }
    }

    pub fn apply(&self, item: &mut StoryboardItem) {
        if let Some(script) = &self.script {
            item.script = script.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(screenshot) = &self.screenshot {
            item.screenshot = Some(screenshot.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    /// height / width, with a zero width treated as a square frame.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f64 / self.width as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub dimensions: VideoDimensions,
    pub duration: f64,
}
