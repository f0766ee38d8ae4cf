//! Analyzer error types.

use thiserror::Error;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors from the two model stages.
///
/// Timeouts are distinct from model-reported errors so the caller can tell
/// an overrun apart from a bad response.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Frame analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Frame analysis timed out after {0} seconds")]
    AnalysisTimeout(u64),

    #[error("Structuring returned invalid JSON: {0}")]
    StructuringParseFailed(#[source] serde_json::Error),

    #[error("Structuring output violates schema: {0}")]
    StructuringSchemaFailed(String),

    #[error("Structuring timed out after {0} seconds")]
    StructuringTimeout(u64),

    #[error("Model request failed: {0}")]
    RequestFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub fn analysis_failed(msg: impl Into<String>) -> Self {
        Self::AnalysisFailed(msg.into())
    }

    pub fn schema_failed(msg: impl Into<String>) -> Self {
        Self::StructuringSchemaFailed(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }
}
