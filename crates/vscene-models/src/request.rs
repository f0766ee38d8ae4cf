//! Analysis request DTOs and input validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use validator::Validate;

use crate::callback::CallbackTarget;

/// Default sampling interval between frames, in seconds.
pub const DEFAULT_FRAME_INTERVAL_SECONDS: f64 = 2.0;

/// Default cap on the number of frames sampled from a video.
pub const DEFAULT_MAX_FRAMES: u32 = 200;

/// Errors produced by request validation, before the pipeline starts.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

/// Request to analyze a video from a direct URL.
///
/// Validated once at the API boundary and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// Direct video URL (http/https)
    pub video_url: String,

    /// Interval between sampled frames, in seconds
    #[serde(default = "default_frame_interval")]
    #[validate(range(exclusive_min = 0.0, max = 10.0, message = "frame_interval_seconds must be in (0, 10]"))]
    pub frame_interval_seconds: f64,

    /// Maximum number of frames to sample
    #[serde(default = "default_max_frames")]
    #[validate(range(min = 1, max = 500, message = "max_frames must be between 1 and 500"))]
    pub max_frames: u32,
}

fn default_frame_interval() -> f64 {
    DEFAULT_FRAME_INTERVAL_SECONDS
}

fn default_max_frames() -> u32 {
    DEFAULT_MAX_FRAMES
}

impl AnalyzeRequest {
    /// Create a request with default sampling parameters.
    pub fn new(video_url: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            frame_interval_seconds: DEFAULT_FRAME_INTERVAL_SECONDS,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }

    /// Validate the request: URL shape and sampling parameter ranges.
    pub fn check(&self) -> Result<(), RequestError> {
        if self.video_url.trim().is_empty() {
            return Err(RequestError::InvalidUrl("video_url is required".to_string()));
        }

        let parsed = Url::parse(&self.video_url)
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {}", self.video_url, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RequestError::InvalidUrl(format!(
                    "unsupported scheme '{}', only http/https are allowed",
                    other
                )))
            }
        }

        if parsed.host_str().is_none() {
            return Err(RequestError::InvalidUrl("URL has no host".to_string()));
        }

        self.validate().map_err(|e| RequestError::Invalid(e.to_string()))
    }
}

/// Request for the asynchronous submission endpoint.
///
/// Same analysis parameters as [`AnalyzeRequest`], plus optional callback
/// targets that each receive the terminal payload once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(flatten)]
    pub request: AnalyzeRequest,

    /// Delivery targets for the terminal payload
    #[serde(default)]
    pub callbacks: Vec<CallbackTarget>,
}

/// Acknowledgment returned by the asynchronous submission endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAccepted {
    /// Identifier of the accepted run
    pub job_id: String,

    /// Always "accepted"
    pub status: String,
}
