//! FFprobe video inspection.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Video file information relevant to frame sampling.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Frame rate (fps) of the video stream
    pub fps: f64,
    /// Total frame count, when the container reports one
    pub frames: Option<u64>,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    duration: Option<String>,
    nb_frames: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file for duration and frame rate.
///
/// Prefers the container-level duration; when the container reports none,
/// falls back to the video stream's duration and finally to a decode-based
/// estimate of `frame count / frame rate`. A file whose duration cannot be
/// determined by any path is rejected, since duration is a precondition for
/// frame sampling and scene validation.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            "ffprobe failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::ffprobe_failed("no video stream found", None))?;

    let fps = video_stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| video_stream.r_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or(0.0);

    let frames = video_stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok());

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            video_stream
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok())
        })
        .or_else(|| {
            // Decode-based estimate when the container carries no duration.
            match (frames, fps > 0.0) {
                (Some(n), true) => {
                    let estimate = n as f64 / fps;
                    warn!(
                        "Container reports no duration for {}, estimating {:.2}s from {} frames @ {:.2} fps",
                        path.display(),
                        estimate,
                        n,
                        fps
                    );
                    Some(estimate)
                }
                _ => None,
            }
        })
        .filter(|d| *d > 0.0)
        .ok_or(MediaError::UnknownDuration)?;

    debug!(
        "Probed {}: duration={:.2}s fps={:.2} frames={:?}",
        path.display(),
        duration,
        fps,
        frames
    );

    Ok(VideoInfo {
        duration,
        fps,
        frames,
    })
}

/// Parse an ffprobe rational rate string like "30000/1001" or "25/1".
fn parse_rate(rate: &str) -> Option<f64> {
    let mut parts = rate.splitn(2, '/');
    let num: f64 = parts.next()?.trim().parse().ok()?;
    let den: f64 = match parts.next() {
        Some(d) => d.trim().parse().ok()?,
        None => 1.0,
    };
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
