use std::path::Path;

/// Format seconds as M:SS, flooring both parts (125.9 -> "2:05")
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{}:{:02}", mins, secs)
}

/// Format a segment span as "M:SS - M:SS"
pub fn format_time_range(start: f64, end: f64) -> String {
    format!("{} - {}", format_timestamp(start), format_timestamp(end))
}

/// Deck file name derived from the video name: everything before the first dot.
pub fn deck_file_name(video_name: Option<&str>, extension: &str) -> String {
    let stem = video_name
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().to_string())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "teardown_storyboard".to_string());
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(65.0), "1:05");
        assert_eq!(format_timestamp(5.0), "0:05");
        assert_eq!(format_timestamp(600.0), "10:00");
        assert_eq!(format_timestamp(125.0), "2:05");
        assert_eq!(format_timestamp(59.99), "0:59");
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range(12.0, 20.5), "0:12 - 0:20");
    }

    #[test]
    fn test_deck_file_name() {
        assert_eq!(deck_file_name(Some("clip.final.mp4"), "json"), "clip.json");
        assert_eq!(deck_file_name(Some("/tmp/videos/talk.mov"), "json"), "talk.json");
        assert_eq!(deck_file_name(Some(".mp4"), "json"), "teardown_storyboard.json");
        assert_eq!(deck_file_name(None, "pptx"), "teardown_storyboard.pptx");
    }
}
