//! Two-stage AI scene analysis over sampled frames.
//!
//! Stage A sends the frames to a vision model for free-text scene and
//! physics analysis; stage B asks a smaller model to structure that text
//! into the scene JSON schema. Each stage runs under its own timeout.

pub mod client;
pub mod config;
pub mod error;
pub mod frame_analysis;
pub mod structuring;

use serde_json::Value;

use vscene_media::Frame;

pub use client::{ChatClient, ChatMessage, ContentPart, ImageUrl, MessageContent};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, AnalyzerResult};
pub use frame_analysis::{analyze_frames, MIN_ANALYSIS_CHARS};
pub use structuring::{strip_code_fences, structure_analysis};

/// The two-stage analyzer: one client, two model handles.
///
/// Constructed once per process and shared read-only across concurrent
/// runs.
#[derive(Debug, Clone)]
pub struct Analyzer {
    client: ChatClient,
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer from config, reusing the given HTTP client.
    pub fn new(config: AnalyzerConfig, http: reqwest::Client) -> Self {
        let client = ChatClient::new(&config.base_url, &config.api_key, http);
        Self { client, config }
    }

    /// Stage A: free-text analysis of the sampled frames.
    pub async fn analyze_frames(&self, frames: &[Frame]) -> AnalyzerResult<String> {
        frame_analysis::analyze_frames(
            &self.client,
            &self.config.analysis_model,
            frames,
            self.config.inline_image_cap_bytes,
            self.config.call_timeout,
        )
        .await
    }

    /// Stage B: structure stage-A text into the scene schema.
    pub async fn structure_analysis(&self, analysis_text: &str) -> AnalyzerResult<Value> {
        structuring::structure_analysis(
            &self.client,
            &self.config.structuring_model,
            analysis_text,
            self.config.call_timeout,
        )
        .await
    }
}
