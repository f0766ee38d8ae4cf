//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while downloading or decoding media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Download exceeded size limit of {limit} bytes")]
    SizeExceeded { limit: u64 },

    #[error("Download timed out after {0} seconds")]
    DownloadTimeout(u64),

    #[error("Downloaded file is empty")]
    EmptyDownload,

    #[error("Video duration {duration:.1}s exceeds maximum of {limit:.1}s")]
    VideoTooLong { duration: f64, limit: f64 },

    #[error("Video duration could not be determined")]
    UnknownDuration,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Frame extraction failed; primary: {primary}; fallback: {fallback}")]
    ExtractionFailed {
        primary: Box<MediaError>,
        fallback: Box<MediaError>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }
}
