use async_trait::async_trait;
use base64::prelude::*;
use tracing::{debug, warn};

use crate::{error::AnalyzerError, provider::Provider, types::Segment};

static STORYBOARD_PROMPT: &str = r#"
  Analyze this video and provide a comprehensive storyboard breakdown.
  Crucial Instructions:
  1. Divide the video into logical sections based on spoken phrases and visual shifts.
  2. For each section, provide:
     - 'startTime': Start timestamp in seconds.
     - 'endTime': End timestamp in seconds.
     - 'script': The EXACT verbatim spoken words from the audio. Do NOT summarize the dialogue. If there is no talking, mark as "[Music/No Audio]".
     - 'description': A concise but descriptive summary of the visual action or scene occurring during this segment.

  Ensure segments cover the entire video duration.
  Return the result as a JSON array of objects.
"#;

/// Transcribes and segments a video. Opaque to the pipeline: bytes and a
/// mime type in, ordered segments out.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, video: &[u8], mime_type: &str) -> Result<Vec<Segment>, AnalyzerError>;
}

pub struct GeminiAnalyzer {
    provider: Provider,
    client: reqwest::Client,
}

impl GeminiAnalyzer {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(video: &[u8], mime_type: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": BASE64_STANDARD.encode(video),
                        }
                    },
                    { "text": STORYBOARD_PROMPT },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "startTime": { "type": "NUMBER" },
                            "endTime": { "type": "NUMBER" },
                            "script": {
                                "type": "STRING",
                                "description": "Verbatim transcription of dialogue",
                            },
                            "description": {
                                "type": "STRING",
                                "description": "Visual action summary",
                            },
                        },
                        "required": ["startTime", "endTime", "script", "description"],
                    },
                },
            },
        })
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, video: &[u8], mime_type: &str) -> Result<Vec<Segment>, AnalyzerError> {
        let api_key = self.provider.validate_api_key()?;

        let response = self
            .client
            .post(self.provider.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(video, mime_type))
            .send()
            .await?;

        let status = response.status();
        let body = response.json::<serde_json::Value>().await?;
        debug!(%status, model = self.provider.config().model, "analyzer responded");

        if !status.is_success() {
            return Err(AnalyzerError::InvalidResponse {
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let segments = parse_segments(&response_text(&body)?)?;
        validate_segments(&segments)?;
        Ok(segments)
    }
}

/// Concatenated text parts of the first candidate. An empty answer is an
/// empty array.
fn response_text(body: &serde_json::Value) -> Result<String, AnalyzerError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AnalyzerError::InvalidResponse {
            reason: format!("Invalid API response structure: {:?}", body),
        })?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Ok("[]".to_string());
    }
    Ok(text)
}

pub fn parse_segments(text: &str) -> Result<Vec<Segment>, AnalyzerError> {
    Ok(serde_json::from_str(text.trim())?)
}

/// Reject individually malformed spans. Ordering problems are only logged:
/// the pipeline never reorders what the analyzer delivered.
pub fn validate_segments(segments: &[Segment]) -> Result<(), AnalyzerError> {
    for (index, seg) in segments.iter().enumerate() {
        let reason = if !seg.start_time.is_finite() || !seg.end_time.is_finite() {
            Some("times must be finite")
        } else if seg.start_time < 0.0 {
            Some("start time is negative")
        } else if seg.end_time <= seg.start_time {
            Some("end time is not after start time")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(AnalyzerError::InvalidSegment {
                index: index + 1,
                reason: format!("{} ({} - {})", reason, seg.start_time, seg.end_time),
            });
        }
    }

    for (index, pair) in segments.windows(2).enumerate() {
        if pair[1].start_time < pair[0].end_time {
            warn!(
                segment = index + 2,
                start = pair[1].start_time,
                previous_end = pair[0].end_time,
                "segment overlaps or precedes the previous one, keeping delivered order"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> Segment {
        Segment {
            start_time: start,
            end_time: end,
            script: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "[{\"startTime\":0,\"endTime\":5,"},
                {"text": "\"script\":\"hi\",\"description\":\"d\"}]"}
            ]}}]
        });
        let segments = parse_segments(&response_text(&body).unwrap()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].script, "hi");
    }

    #[test]
    fn test_empty_answer_is_empty_storyboard() {
        let body = serde_json::json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]});
        assert!(parse_segments(&response_text(&body).unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_candidates_is_invalid_response() {
        let body = serde_json::json!({"error": {"message": "quota"}});
        let err = response_text(&body).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidResponse { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to analyze video. Ensure the file is valid and accessible."
        );
        assert!(err.cause().contains("quota"));
    }

    #[test]
    fn test_non_json_text_is_single_descriptive_error() {
        let err = parse_segments("Sure! Here is your storyboard").unwrap_err();
        assert!(matches!(err, AnalyzerError::Json(_)));
        assert!(err.to_string().starts_with("Failed to analyze video"));
    }

    #[test]
    fn test_validate_rejects_inverted_span() {
        let err = validate_segments(&[seg(0.0, 5.0), seg(7.0, 7.0)]).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidSegment { index: 2, .. }));
        assert!(err.to_string().starts_with("Failed to analyze video"));
        assert!(err.cause().contains("segment 2"));
        assert!(validate_segments(&[seg(-1.0, 2.0)]).is_err());
        assert!(validate_segments(&[seg(0.0, f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_missing_key_keeps_detail_in_cause() {
        let err = AnalyzerError::MissingApiKey {
            env_var: "GEMINI_API_KEY".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to analyze video. Ensure the file is valid and accessible."
        );
        assert!(err.cause().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_validate_accepts_unsorted_and_overlapping() {
        assert!(validate_segments(&[seg(10.0, 20.0), seg(0.0, 5.0), seg(4.0, 9.0)]).is_ok());
        assert!(validate_segments(&[]).is_ok());
    }

    #[test]
    fn test_request_body_inlines_base64_video() {
        let body = GeminiAnalyzer::request_body(&[0xff, 0xd8], "video/mp4");
        let inline = &body["contents"][0]["parts"][0]["inline_data"];
        assert_eq!(inline["mime_type"], "video/mp4");
        assert_eq!(inline["data"], "/9g=");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }
}
