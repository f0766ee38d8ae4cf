//! Run orchestration for video scene analysis.
//!
//! This crate binds the download, frame-sampling and analysis stages into
//! a state machine with a guaranteed-cleanup workspace per run, bounded by
//! a worker pool.

pub mod config;
pub mod error;
pub mod pool;
pub mod run;
pub mod validate;
pub mod workspace;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pool::WorkerPool;
pub use run::{Pipeline, RunStage};
pub use validate::clean_scenes;
pub use workspace::RunWorkspace;
