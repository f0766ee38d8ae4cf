//! Pipeline error taxonomy.
//!
//! Every error is terminal for its run and tagged with the stage it arose
//! in. There is no cross-stage retry; the caller receives exactly one
//! terminal outcome per run.

use thiserror::Error;

use vscene_analyzer::AnalyzerError;
use vscene_media::MediaError;
use vscene_models::RequestError;

use crate::run::RunStage;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal run errors, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input validation failed: {0}")]
    InputValidation(#[source] RequestError),

    #[error("Download failed: {0}")]
    Download(#[source] MediaError),

    #[error("Frame extraction failed: {0}")]
    Extraction(#[source] MediaError),

    #[error("Frame analysis failed: {0}")]
    Analysis(#[source] AnalyzerError),

    #[error("Structuring failed: {0}")]
    Structuring(#[source] AnalyzerError),

    #[error("Validation failed: no scenes survived repair")]
    Validation,

    #[error("Run workspace error: {0}")]
    Workspace(#[from] std::io::Error),
}

impl PipelineError {
    /// The stage this error arose in.
    pub fn stage(&self) -> RunStage {
        match self {
            Self::InputValidation(_) => RunStage::Init,
            Self::Workspace(_) => RunStage::Init,
            Self::Download(_) => RunStage::Downloading,
            Self::Extraction(_) => RunStage::ExtractingFrames,
            Self::Analysis(_) => RunStage::AnalyzingFrames,
            Self::Structuring(_) => RunStage::Structuring,
            Self::Validation => RunStage::Validating,
        }
    }

    /// Stable taxonomy name for API payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputValidation(_) => "input_validation",
            Self::Workspace(_) => "workspace_failure",
            Self::Download(_) => "download_failure",
            Self::Extraction(_) => "extraction_failure",
            Self::Analysis(AnalyzerError::AnalysisTimeout(_)) => "analysis_timeout",
            Self::Analysis(_) => "analysis_failure",
            Self::Structuring(AnalyzerError::StructuringParseFailed(_)) => {
                "structuring_parse_failure"
            }
            Self::Structuring(AnalyzerError::StructuringTimeout(_)) => "structuring_timeout",
            Self::Structuring(AnalyzerError::RequestFailed(_)) => "structuring_failure",
            Self::Structuring(_) => "structuring_schema_failure",
            Self::Validation => "validation_failure",
        }
    }

    /// True when the input itself was rejected (maps to HTTP 400).
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputValidation(_))
            || matches!(self, Self::Download(MediaError::InvalidUrl(_)))
    }

    /// True when the video exceeded a configured limit (maps to HTTP 413).
    pub fn is_limit_error(&self) -> bool {
        matches!(
            self,
            Self::Download(MediaError::SizeExceeded { .. })
                | Self::Extraction(MediaError::VideoTooLong { .. })
        )
    }
}
