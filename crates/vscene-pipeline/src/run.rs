//! Run orchestration.
//!
//! One run walks the stage sequence Downloading → ExtractingFrames →
//! AnalyzingFrames → Structuring → Validating, advancing only on the prior
//! stage's unqualified success. The first error wins and the run moves to
//! Failed; either way the workspace cleanup executes before the outcome is
//! returned.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, warn};
use uuid::Uuid;

use vscene_analyzer::Analyzer;
use vscene_media::{download_video, extract_frames, FrameSet};
use vscene_models::{AnalyzeRequest, AnalyzeResponse};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::pool::WorkerPool;
use crate::validate::clean_scenes;
use crate::workspace::RunWorkspace;

/// Stages of a run's state machine.
///
/// `Failed` is reachable from every non-terminal state; `Done` only from
/// `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Init,
    Downloading,
    ExtractingFrames,
    AnalyzingFrames,
    Structuring,
    Validating,
    Done,
    Failed,
}

impl RunStage {
    /// Returns the stage as a string for logs and labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Downloading => "downloading",
            Self::ExtractingFrames => "extracting_frames",
            Self::AnalyzingFrames => "analyzing_frames",
            Self::Structuring => "structuring",
            Self::Validating => "validating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The analysis pipeline: shared clients, limits, and the worker pool.
///
/// Cheap to clone; all shared pieces are reference-counted.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    analyzer: Arc<Analyzer>,
    http: reqwest::Client,
    pool: WorkerPool,
}

impl Pipeline {
    /// Create a pipeline with explicitly constructed collaborators.
    pub fn new(config: PipelineConfig, analyzer: Analyzer, http: reqwest::Client) -> Self {
        let pool = WorkerPool::new(config.workers);
        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
            http,
            pool,
        }
    }

    /// Configured limits, for the status surface.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Worker slots currently free.
    pub fn available_workers(&self) -> usize {
        self.pool.available()
    }

    /// Execute one run end to end.
    ///
    /// Waits for a worker slot, creates an isolated workspace, walks the
    /// stages, and cleans the workspace up on every outcome. Exactly one
    /// terminal result is returned per call.
    pub async fn run(&self, request: AnalyzeRequest) -> PipelineResult<AnalyzeResponse> {
        request.check().map_err(PipelineError::InputValidation)?;

        let _permit = self.pool.acquire().await;
        let run_id = Uuid::new_v4();
        info!(%run_id, url = %request.video_url, "Starting analysis run");

        let started = Instant::now();
        let mut workspace = RunWorkspace::create(&self.config.temp_root).await?;

        let result = self.execute(&request, &workspace, run_id).await;

        // Unconditional, idempotent; its own failures are logged inside and
        // never override the run outcome.
        workspace.cleanup().await;

        let elapsed = started.elapsed();
        match &result {
            Ok(response) => {
                info!(
                    %run_id,
                    stage = %RunStage::Done,
                    scenes = response.scenes.len(),
                    elapsed_s = elapsed.as_secs_f64(),
                    "Run completed"
                );
                counter!("vscene_runs_total", "outcome" => "success").increment(1);
            }
            Err(e) => {
                warn!(
                    %run_id,
                    stage = %RunStage::Failed,
                    failed_in = %e.stage(),
                    kind = e.kind(),
                    elapsed_s = elapsed.as_secs_f64(),
                    "Run failed: {}",
                    e
                );
                counter!("vscene_runs_total", "outcome" => "failure").increment(1);
            }
        }
        histogram!("vscene_run_duration_seconds").record(elapsed.as_secs_f64());

        result
    }

    async fn execute(
        &self,
        request: &AnalyzeRequest,
        workspace: &RunWorkspace,
        run_id: Uuid,
    ) -> PipelineResult<AnalyzeResponse> {
        info!(%run_id, stage = %RunStage::Downloading, "Downloading video");
        let video = self
            .timed(RunStage::Downloading, async {
                download_video(
                    &self.http,
                    &request.video_url,
                    &workspace.video_dir(),
                    self.config.max_video_bytes,
                    self.config.download_timeout,
                )
                .await
            })
            .await
            .map_err(PipelineError::Download)?;

        info!(%run_id, stage = %RunStage::ExtractingFrames, "Extracting frames");
        let max_frames = request.max_frames.min(self.config.max_frames);
        let FrameSet { frames, duration } = self
            .timed(RunStage::ExtractingFrames, async {
                extract_frames(
                    &video.path,
                    &workspace.frames_dir(),
                    request.frame_interval_seconds,
                    max_frames,
                    self.config.max_video_duration,
                )
                .await
            })
            .await
            .map_err(PipelineError::Extraction)?;

        info!(
            %run_id,
            stage = %RunStage::AnalyzingFrames,
            frames = frames.len(),
            "Analyzing frames"
        );
        let frame_analysis = self
            .timed(RunStage::AnalyzingFrames, self.analyzer.analyze_frames(&frames))
            .await
            .map_err(PipelineError::Analysis)?;

        info!(%run_id, stage = %RunStage::Structuring, "Structuring analysis");
        let structured = self
            .timed(
                RunStage::Structuring,
                self.analyzer.structure_analysis(&frame_analysis),
            )
            .await
            .map_err(PipelineError::Structuring)?;

        info!(%run_id, stage = %RunStage::Validating, "Validating scenes");
        let scenes = clean_scenes(&structured, duration)?;

        Ok(AnalyzeResponse {
            scenes,
            frame_analysis,
        })
    }

    async fn timed<T, E>(
        &self,
        stage: RunStage,
        fut: impl std::future::Future<Output = Result<T, E>>,
    ) -> Result<T, E> {
        let started = Instant::now();
        let result = fut.await;
        histogram!("vscene_stage_duration_seconds", "stage" => stage.as_str())
            .record(started.elapsed().as_secs_f64());
        result
    }
}
