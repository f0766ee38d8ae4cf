//! Application state.

use vscene_pipeline::Pipeline;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Pipeline,
    /// Outbound client for callback deliveries.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state around an already-built pipeline.
    pub fn new(config: ApiConfig, pipeline: Pipeline, http: reqwest::Client) -> Self {
        Self {
            config,
            pipeline,
            http,
        }
    }
}
