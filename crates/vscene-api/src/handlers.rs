//! Request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use vscene_models::{AnalyzeRequest, AnalyzeResponse, SubmitAccepted, SubmitRequest};

use crate::callback::{deliver_callbacks, CallbackPayload};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Configured limits, reported by the status endpoint.
#[derive(Serialize)]
pub struct StatusResponse {
    pub workers: usize,
    pub available_workers: usize,
    pub max_frames: u32,
    pub max_video_duration_seconds: f64,
    pub max_video_size_bytes: u64,
    pub default_frame_interval_seconds: f64,
}

/// Service status endpoint.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.pipeline.config();
    Json(StatusResponse {
        workers: config.workers,
        available_workers: state.pipeline.available_workers(),
        max_frames: config.max_frames,
        max_video_duration_seconds: config.max_video_duration,
        max_video_size_bytes: config.max_video_bytes,
        default_frame_interval_seconds: config.default_frame_interval,
    })
}

/// Synchronous analysis endpoint.
///
/// Runs the whole pipeline in the request's lifetime and returns the
/// validated scenes, or the mapped error status.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let response = state.pipeline.run(request).await?;
    Ok(Json(response))
}

/// Asynchronous submission endpoint.
///
/// Validates up front, acknowledges with 202, and runs the pipeline in a
/// detached task. The terminal payload goes to every callback target once.
pub async fn submit(
    State(state): State<AppState>,
    Json(submission): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<SubmitAccepted>)> {
    submission
        .request
        .check()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job_id = Uuid::new_v4().to_string();
    info!(%job_id, url = %submission.request.video_url, "Accepted analysis submission");

    let task_state = state.clone();
    let task_job_id = job_id.clone();
    tokio::spawn(async move {
        let payload = match task_state.pipeline.run(submission.request).await {
            Ok(result) => CallbackPayload::completed(task_job_id, result),
            Err(e) => CallbackPayload::failed(task_job_id, e.kind(), e.to_string()),
        };
        deliver_callbacks(&task_state.http, &submission.callbacks, &payload).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitAccepted {
            job_id,
            status: "accepted".to_string(),
        }),
    ))
}
