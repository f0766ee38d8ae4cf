//! Video acquisition and frame sampling via FFmpeg.
//!
//! This crate provides:
//! - Streaming download with size/time budgets
//! - FFprobe duration/frame-rate inspection with a decode-based fallback
//! - Frame extraction as an ordered list of strategies with automatic
//!   fallback

pub mod download;
pub mod error;
pub mod frames;
pub mod probe;

pub use download::{download_video, DownloadedVideo};
pub use error::{MediaError, MediaResult};
pub use frames::{
    extract_frames, target_frame_count, ExtractionStrategy, Frame, FrameSet, SamplingPlan,
};
pub use probe::{probe_video, VideoInfo};
