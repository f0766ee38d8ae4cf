//! Chat-completions client.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` wire format. Clients
//! are constructed once per process and shared read-only across concurrent
//! runs; per-call timeouts are enforced by the stages, not here.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyzerError, AnalyzerResult};

/// Chat-completions API client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: String,
    api_key: String,
    client: Client,
}

/// One chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content: plain text or a multimodal part list.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A multimodal content part.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Create a client for the given endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Send one completion request and return the first choice's content.
    pub async fn complete(&self, model: &str, messages: &[ChatMessage]) -> AnalyzerResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest { model, messages };

        debug!("Invoking model {} with {} messages", model, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::request_failed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::request_failed(format!(
                "model endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::request_failed(format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AnalyzerError::request_failed("no content in model response"))
    }
}
