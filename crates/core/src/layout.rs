//! Deck layout: where the frame goes on a 16:9 slide, and what text
//! surrounds it. All coordinates are inches from the top-left corner.

use serde::{Deserialize, Serialize};

use crate::{
    format::format_time_range,
    types::{EncodedImage, StoryboardItem, VideoDimensions},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Fixed slide geometry. The image box sits between the text band at the
/// top and the caption band at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckGeometry {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub max_image_width: f64,
    pub max_image_height: f64,
    pub image_top: f64,
}

impl Default for DeckGeometry {
    fn default() -> Self {
        Self {
            canvas_width: 10.0,
            canvas_height: 5.625,
            max_image_width: 6.25,
            max_image_height: 3.15,
            image_top: 1.7,
        }
    }
}

impl DeckGeometry {
    /// Largest undistorted rectangle inside the image box, centered horizontally.
    ///
    /// Width is the dominant constraint; height only wins when the frame is
    /// taller than the box allows.
    pub fn fit_image(&self, video: VideoDimensions) -> Rect {
        let ratio = video.aspect_ratio();
        let mut width = self.max_image_width;
        let mut height = width * ratio;

        if height > self.max_image_height {
            height = self.max_image_height;
            width = height / if ratio == 0.0 { 1.0 } else { ratio };
        }

        Rect {
            x: (self.canvas_width - width) / 2.0,
            y: self.image_top,
            w: width,
            h: height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub rect: Rect,
    /// Hex RGB without the leading `#`.
    pub color: String,
    pub font_size: f64,
    pub align: Align,
    pub valign: VAlign,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub image: EncodedImage,
    pub rect: Rect,
}

/// Everything a deck serializer needs to draw one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub background: String,
    pub texts: Vec<TextBlock>,
    pub image: Option<ImageBlock>,
}

pub const DECK_BACKGROUND: &str = "0A0A0A";
pub const DECK_TITLE: &str = "TEARDOWN STORYBOARD";

fn text(text: String, rect: Rect, color: &str, font_size: f64) -> TextBlock {
    TextBlock {
        text,
        rect,
        color: color.to_string(),
        font_size,
        align: Align::Center,
        valign: VAlign::Top,
        bold: false,
        italic: false,
    }
}

/// Compose slide `number` (1-based) for `item`, placing any screenshot in `image_rect`.
pub fn compose_slide(number: usize, item: &StoryboardItem, image_rect: Rect) -> Slide {
    let header = TextBlock {
        align: Align::Left,
        bold: true,
        ..text(
            DECK_TITLE.to_string(),
            Rect { x: 0.5, y: 0.1, w: 4.0, h: 0.2 },
            "FFFFFF",
            8.0,
        )
    };

    let transcript = TextBlock {
        bold: true,
        italic: true,
        ..text(
            format!("SCRIPT: \"{}\"", item.script),
            Rect { x: 0.5, y: 0.4, w: 9.0, h: 0.7 },
            "FFFFFF",
            14.0,
        )
    };

    let description = text(
        format!("ACTION: {}", item.description),
        Rect { x: 0.5, y: 1.1, w: 9.0, h: 0.4 },
        "AAAAAA",
        10.0,
    );

    let caption = text(
        format!(
            "SLIDE {} • {}",
            number,
            format_time_range(item.start_time, item.end_time)
        ),
        Rect { x: 0.5, y: 5.3, w: 9.0, h: 0.2 },
        "333333",
        7.0,
    );

    Slide {
        background: DECK_BACKGROUND.to_string(),
        texts: vec![header, transcript, description, caption],
        image: item.visible_screenshot().map(|image| ImageBlock {
            image: image.clone(),
            rect: image_rect,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;

    const EPS: f64 = 1e-9;

    fn dims(width: u32, height: u32) -> VideoDimensions {
        VideoDimensions { width, height }
    }

    fn assert_within_bounds(rect: Rect, geometry: &DeckGeometry) {
        assert!(rect.w <= geometry.max_image_width + EPS);
        assert!(rect.h <= geometry.max_image_height + EPS);
        assert!(rect.x >= -EPS);
        assert!(rect.x + rect.w <= geometry.canvas_width + EPS);
    }

    #[test]
    fn test_full_hd_is_height_bound() {
        let geometry = DeckGeometry::default();
        let rect = geometry.fit_image(dims(1920, 1080));

        assert!((rect.h - 3.15).abs() < EPS);
        assert!((rect.w - 5.6).abs() < EPS);
        assert!((rect.x - 2.2).abs() < EPS);
        assert_eq!(rect.y, 1.7);
        assert_within_bounds(rect, &geometry);
    }

    #[test]
    fn test_wide_video_is_width_bound() {
        let geometry = DeckGeometry::default();
        let rect = geometry.fit_image(dims(2560, 1080));

        assert_eq!(rect.w, 6.25);
        assert!((rect.h - 6.25 * 1080.0 / 2560.0).abs() < EPS);
        assert!((rect.x - 1.875).abs() < EPS);
        assert_within_bounds(rect, &geometry);
    }

    #[test]
    fn test_portrait_keeps_ratio() {
        let geometry = DeckGeometry::default();
        let rect = geometry.fit_image(dims(1080, 1920));

        assert!((rect.h / rect.w - 1920.0 / 1080.0).abs() < 1e-6);
        assert_within_bounds(rect, &geometry);
    }

    #[test]
    fn test_degenerate_dimensions_do_not_blow_up() {
        let geometry = DeckGeometry::default();

        let zero_width = geometry.fit_image(dims(0, 720));
        assert_within_bounds(zero_width, &geometry);
        assert!((zero_width.w - 3.15).abs() < EPS);

        let zero_height = geometry.fit_image(dims(1280, 0));
        assert_eq!(zero_height.w, 6.25);
        assert_eq!(zero_height.h, 0.0);
    }

    fn item(script: &str, start: f64, end: f64, screenshot: EncodedImage) -> StoryboardItem {
        StoryboardItem::from_segment(
            Segment {
                start_time: start,
                end_time: end,
                script: script.into(),
                description: "wide shot".into(),
            },
            screenshot,
        )
    }

    #[test]
    fn test_compose_slide_text_blocks() {
        let it = item("Hello there", 65.0, 125.0, EncodedImage::jpeg(vec![1]));
        let rect = DeckGeometry::default().fit_image(dims(1280, 720));
        let slide = compose_slide(3, &it, rect);

        let texts: Vec<_> = slide.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "TEARDOWN STORYBOARD",
                "SCRIPT: \"Hello there\"",
                "ACTION: wide shot",
                "SLIDE 3 • 1:05 - 2:05",
            ]
        );
        assert!(slide.texts[1].italic && slide.texts[1].bold);
        assert_eq!(slide.texts[1].valign, VAlign::Top);
        assert_eq!(slide.texts[1].align, Align::Center);
        assert!(slide.texts[2].font_size < slide.texts[1].font_size);
        assert_eq!(slide.image.as_ref().map(|i| i.rect), Some(rect));
        assert_eq!(slide.background, DECK_BACKGROUND);
    }

    #[test]
    fn test_blank_screenshot_gets_no_image() {
        let it = item("...", 0.0, 1.0, EncodedImage::blank());
        let slide = compose_slide(1, &it, DeckGeometry::default().fit_image(dims(1280, 720)));
        assert!(slide.image.is_none());
    }
}
