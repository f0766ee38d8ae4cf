//! Stage A: free-text scene and physics analysis over sampled frames.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use tokio::fs;
use tracing::{info, warn};

use vscene_media::Frame;

use crate::client::{ChatClient, ChatMessage, ContentPart, ImageUrl};
use crate::error::{AnalyzerError, AnalyzerResult};

/// Responses shorter than this are treated as a failed analysis.
pub const MIN_ANALYSIS_CHARS: usize = 50;

const SYSTEM_PROMPT: &str = "You are an expert video analyst. Analyze the provided video frames to create a detailed scene-by-scene analysis describing:
- What objects/entities are present in each frame
- Motion and behavior of objects between frames
- Notable events (collisions, changes of direction, appearances/disappearances)
- Rough timestamps where things occur
- Physics observations (e.g., acceleration, speed estimates, forces, gravity effects, momentum transfers)

Provide clear time-coded notes and keep the analysis factual and detailed. Focus on actual visual content you can observe.";

/// Run stage A: one request carrying every frame, inline when small enough.
///
/// Frames over `inline_cap_bytes` are represented by a textual placeholder
/// instead of an inline image. The call runs under `timeout`; overrunning
/// it is a timeout error distinct from a model-reported failure.
pub async fn analyze_frames(
    client: &ChatClient,
    model: &str,
    frames: &[Frame],
    inline_cap_bytes: u64,
    timeout: Duration,
) -> AnalyzerResult<String> {
    info!("Analyzing {} frames with model {}", frames.len(), model);

    let mut descriptions = Vec::with_capacity(frames.len());
    let mut images = Vec::new();

    for frame in frames {
        match encode_inline(&frame.path, inline_cap_bytes).await {
            Some(data_url) => {
                images.push(ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                });
                descriptions.push(format!(
                    "Frame at {:.1}s: [Image provided for visual analysis]",
                    frame.timestamp
                ));
            }
            None => {
                descriptions.push(format!(
                    "Frame at {:.1}s: Video frame extracted from {}",
                    frame.timestamp,
                    frame
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                ));
            }
        }
    }

    let mut parts = vec![ContentPart::Text {
        text: format!(
            "Analyze these {} video frames extracted at the following timestamps:\n\n{}\n\n\
             Provide a comprehensive scene-by-scene analysis with specific timestamps, \
             object movements, and physics observations.",
            frames.len(),
            descriptions.join("\n")
        ),
    }];
    parts.extend(images);

    let messages = [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user_parts(parts),
    ];

    let text = tokio::time::timeout(timeout, client.complete(model, &messages))
        .await
        .map_err(|_| AnalyzerError::AnalysisTimeout(timeout.as_secs()))?
        .map_err(|e| match e {
            AnalyzerError::RequestFailed(msg) => AnalyzerError::AnalysisFailed(msg),
            other => other,
        })?;

    if text.trim().len() < MIN_ANALYSIS_CHARS {
        return Err(AnalyzerError::analysis_failed(
            "model returned empty or very short analysis",
        ));
    }

    info!("Frame analysis completed, {} characters", text.len());
    Ok(text)
}

/// Encode a frame as a `data:image/jpeg` URL, or `None` when it exceeds the
/// inline size cap or cannot be read.
async fn encode_inline(path: &Path, cap_bytes: u64) -> Option<String> {
    let size = match fs::metadata(path).await {
        Ok(m) => m.len(),
        Err(e) => {
            warn!("Failed to stat frame {}: {}", path.display(), e);
            return None;
        }
    };

    if size > cap_bytes {
        warn!(
            "Frame {} too large for inline encoding ({} > {} bytes)",
            path.display(),
            size,
            cap_bytes
        );
        return None;
    }

    match fs::read(path).await {
        Ok(bytes) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            Some(format!("data:image/jpeg;base64,{}", encoded))
        }
        Err(e) => {
            warn!("Failed to read frame {}: {}", path.display(), e);
            None
        }
    }
}
