//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Resource limits and budgets for pipeline runs.
///
/// These are injected at construction; the pipeline never reads the
/// environment itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum concurrent runs
    pub workers: usize,
    /// Maximum number of frames sampled per run
    pub max_frames: u32,
    /// Maximum accepted video duration in seconds
    pub max_video_duration: f64,
    /// Default sampling interval in seconds
    pub default_frame_interval: f64,
    /// Root directory for per-run temporary storage
    pub temp_root: PathBuf,
    /// Maximum accepted video size in bytes
    pub max_video_bytes: u64,
    /// Overall download time budget
    pub download_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_frames: 200,
            max_video_duration: 300.0,
            default_frame_interval: 2.0,
            temp_root: PathBuf::from("/tmp/vscene"),
            max_video_bytes: 500 * 1024 * 1024,
            download_timeout: Duration::from_secs(300),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workers: std::env::var("MAX_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.workers),
            max_frames: std::env::var("MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_frames),
            max_video_duration: std::env::var("MAX_VIDEO_DURATION_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_video_duration),
            default_frame_interval: std::env::var("FRAME_INTERVAL_SECONDS_DEFAULT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_frame_interval),
            temp_root: std::env::var("TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_root),
            max_video_bytes: std::env::var("MAX_VIDEO_SIZE_MB")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_video_bytes),
            download_timeout: Duration::from_secs(
                std::env::var("DOWNLOAD_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }
}
