//! Analyzer configuration.

use std::time::Duration;

/// Configuration for the two-stage analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// API key for the endpoint
    pub api_key: String,
    /// Model used for stage A (vision frame analysis)
    pub analysis_model: String,
    /// Model used for stage B (JSON structuring), typically smaller
    pub structuring_model: String,
    /// Per-frame size cap for inline image encoding, in bytes
    pub inline_image_cap_bytes: u64,
    /// Independent timeout for each model call
    pub call_timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            analysis_model: "gpt-4o".to_string(),
            structuring_model: "gpt-4o-mini".to_string(),
            inline_image_cap_bytes: 200 * 1024,
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl AnalyzerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("MODEL_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("MODEL_API_KEY").unwrap_or_default(),
            analysis_model: std::env::var("ANALYSIS_MODEL").unwrap_or(defaults.analysis_model),
            structuring_model: std::env::var("STRUCTURING_MODEL")
                .unwrap_or(defaults.structuring_model),
            inline_image_cap_bytes: std::env::var("INLINE_IMAGE_CAP_KB")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|kb| kb * 1024)
                .unwrap_or(defaults.inline_image_cap_bytes),
            call_timeout: Duration::from_secs(
                std::env::var("MODEL_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}
