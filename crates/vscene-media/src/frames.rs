//! Frame sampling with an ordered list of extraction strategies.
//!
//! The primary strategy asks FFmpeg for hardware-auto decode with an
//! `fps=1/interval` filter. If it errors or produces zero frames, a
//! decode-and-sample fallback selects every stride-th decoded frame. Only
//! when both fail does extraction fail, carrying both underlying errors.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};

/// A single sampled frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Path of the frame image on disk
    pub path: PathBuf,
    /// Timestamp in seconds: `index * interval`
    pub timestamp: f64,
}

/// Result of frame extraction: ordered frames plus the probed duration.
#[derive(Debug)]
pub struct FrameSet {
    /// Frames in increasing time order
    pub frames: Vec<Frame>,
    /// Probed video duration in seconds
    pub duration: f64,
}

/// Everything a strategy needs to sample frames.
#[derive(Debug, Clone)]
pub struct SamplingPlan {
    /// Input video path
    pub video: PathBuf,
    /// Directory frames are written into
    pub output_dir: PathBuf,
    /// Sampling interval in seconds
    pub interval: f64,
    /// Number of frames to produce at most
    pub target: usize,
    /// Native frame rate of the video stream
    pub fps: f64,
}

/// One way of sampling frames from a video.
///
/// Strategies are tried in order; a failure (process error or zero frames)
/// moves on to the next one.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Sample frames per the plan, returning the ordered frame paths.
    async fn extract(&self, plan: &SamplingPlan) -> MediaResult<Vec<PathBuf>>;
}

/// Compute the number of frames to sample.
///
/// `min(max_frames, floor(duration / interval) + 1)` — one frame at t=0
/// plus one per full interval.
pub fn target_frame_count(duration: f64, interval: f64, max_frames: u32) -> usize {
    let by_duration = (duration / interval).floor() as usize + 1;
    by_duration.min(max_frames as usize)
}

/// Extract frames from `video_path` into `output_dir`.
///
/// Probes the video first and rejects anything longer than `max_duration`
/// seconds. Runs the primary and fallback strategies in order; timestamps
/// are assigned as `i * interval` over the ordered result.
pub async fn extract_frames(
    video_path: &Path,
    output_dir: &Path,
    interval: f64,
    max_frames: u32,
    max_duration: f64,
) -> MediaResult<FrameSet> {
    let info = probe_video(video_path).await?;
    if info.duration > max_duration {
        return Err(MediaError::VideoTooLong {
            duration: info.duration,
            limit: max_duration,
        });
    }

    let plan = plan_for(video_path, output_dir, interval, max_frames, &info);
    info!(
        "Extracting up to {} frames from {:.1}s video at {}s intervals",
        plan.target, info.duration, interval
    );

    let strategies: [&dyn ExtractionStrategy; 2] = [&HwDecodeStrategy, &StrideSampleStrategy];
    let paths = run_strategies(&strategies, &plan).await?;

    Ok(FrameSet {
        frames: frames_with_timestamps(paths, interval),
        duration: info.duration,
    })
}

/// Assign `timestamp = i * interval` over the ordered frame paths.
fn frames_with_timestamps(paths: Vec<PathBuf>, interval: f64) -> Vec<Frame> {
    paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| Frame {
            path,
            timestamp: i as f64 * interval,
        })
        .collect()
}

fn plan_for(
    video_path: &Path,
    output_dir: &Path,
    interval: f64,
    max_frames: u32,
    info: &VideoInfo,
) -> SamplingPlan {
    SamplingPlan {
        video: video_path.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        interval,
        target: target_frame_count(info.duration, interval, max_frames),
        fps: info.fps,
    }
}

/// Try each strategy in order; fail only when all of them have failed.
async fn run_strategies(
    strategies: &[&dyn ExtractionStrategy],
    plan: &SamplingPlan,
) -> MediaResult<Vec<PathBuf>> {
    let mut errors: Vec<MediaError> = Vec::new();

    for strategy in strategies {
        // Leftover frames from a failed earlier attempt must not leak into
        // this strategy's output.
        reset_dir(&plan.output_dir).await?;

        match strategy.extract(plan).await {
            Ok(paths) if !paths.is_empty() => {
                info!("Extracted {} frames via {}", paths.len(), strategy.name());
                return Ok(paths);
            }
            Ok(_) => {
                warn!("Strategy {} produced zero frames", strategy.name());
                errors.push(MediaError::ffmpeg_failed(
                    format!("{} produced zero frames", strategy.name()),
                    None,
                    None,
                ));
            }
            Err(e) => {
                warn!("Strategy {} failed: {}", strategy.name(), e);
                errors.push(e);
            }
        }
    }

    let fallback = errors.pop().unwrap_or_else(|| {
        MediaError::ffmpeg_failed("no extraction strategies configured", None, None)
    });
    let primary = errors.pop().unwrap_or_else(|| {
        MediaError::ffmpeg_failed("no extraction strategies configured", None, None)
    });
    Err(MediaError::ExtractionFailed {
        primary: Box::new(primary),
        fallback: Box::new(fallback),
    })
}

async fn reset_dir(dir: &Path) -> MediaResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).await?;
    }
    fs::create_dir_all(dir).await?;
    Ok(())
}

/// Run ffmpeg with the given filter, then collect numbered frame files.
async fn run_ffmpeg(
    plan: &SamplingPlan,
    pre_input: &[&str],
    extra_output: &[&str],
    filter: &str,
) -> MediaResult<Vec<PathBuf>> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let pattern = plan.output_dir.join("frame_%04d.jpg");

    let output = Command::new("ffmpeg")
        .args(pre_input)
        .arg("-i")
        .arg(&plan.video)
        .args(["-vf", filter])
        .args(extra_output)
        .args(["-q:v", "2"])
        .args(["-frames:v", &plan.target.to_string()])
        .arg("-y")
        .arg(&pattern)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "ffmpeg exited with error",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    collect_frames(&plan.output_dir, plan.target).await
}

/// Collect `frame_0001.jpg..` in order, stopping at the first gap.
async fn collect_frames(dir: &Path, target: usize) -> MediaResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for i in 1..=target {
        let path = dir.join(format!("frame_{:04}.jpg", i));
        match fs::metadata(&path).await {
            Ok(_) => paths.push(path),
            Err(_) => break,
        }
    }
    Ok(paths)
}

/// Primary strategy: hardware-auto decode with an fps filter.
///
/// `-hwaccel auto` degrades to software decode when no accelerator is
/// present, so a failure here usually means a broken input or filter chain.
struct HwDecodeStrategy;

#[async_trait]
impl ExtractionStrategy for HwDecodeStrategy {
    fn name(&self) -> &'static str {
        "hw-decode-fps"
    }

    async fn extract(&self, plan: &SamplingPlan) -> MediaResult<Vec<PathBuf>> {
        let filter = format!("fps=1/{}", plan.interval);
        run_ffmpeg(plan, &["-hwaccel", "auto"], &[], &filter).await
    }
}

/// Fallback strategy: decode every frame and keep every stride-th one.
struct StrideSampleStrategy;

/// Stride between kept frames: `round(fps * interval)`, at least 1.
fn sample_stride(fps: f64, interval: f64) -> u64 {
    let fps = if fps > 0.0 { fps } else { 30.0 };
    ((fps * interval).round() as u64).max(1)
}

#[async_trait]
impl ExtractionStrategy for StrideSampleStrategy {
    fn name(&self) -> &'static str {
        "decode-stride"
    }

    async fn extract(&self, plan: &SamplingPlan) -> MediaResult<Vec<PathBuf>> {
        let stride = sample_stride(plan.fps, plan.interval);
        let filter = format!("select=not(mod(n\\,{}))", stride);
        run_ffmpeg(plan, &[], &["-vsync", "vfr"], &filter).await
    }
}
