use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

/// Multimodal model used to segment and transcribe the video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[default]
    GeminiFlash,
    GeminiPro,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::GeminiFlash => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/models",
                model: "gemini-3-flash-preview",
                env_var: "GEMINI_API_KEY",
            },
            Provider::GeminiPro => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/models",
                model: "gemini-3-pro-preview",
                env_var: "GEMINI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::GeminiFlash => "Gemini Flash",
            Provider::GeminiPro => "Gemini Pro",
        }
    }

    /// Full `generateContent` endpoint for this provider's model.
    pub fn endpoint(&self) -> String {
        let config = self.config();
        format!("{}/{}:generateContent", config.api_url, config.model)
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String, AnalyzerError> {
        let config = self.config();
        std::env::var(config.env_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AnalyzerError::MissingApiKey {
                env_var: config.env_var.to_string(),
            })
    }
}
