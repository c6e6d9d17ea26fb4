use insight_pipeline::{FsSnapshotStore, PipelinePolicy};

use crate::collaborators::{schema_client::SchemaApiClient, stats_client::StatsApiClient};
use crate::error_handler::AppResult;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Base URL of the analysis backend, e.g. "http://localhost:8010/api".
    pub analytics_api_base: String,
    /// Server-side Groq API key; request bodies may override it per call.
    pub groq_api_key: Option<String>,
    /// Client for the statistics endpoints of the analysis backend.
    pub stats: StatsApiClient,
    /// Client for the dataset-schema endpoint of the analysis backend.
    pub schema: SchemaApiClient,
    /// Snapshot store for generated insights.
    pub store: FsSnapshotStore,
    /// Validation policy knobs (env-overridable).
    pub policy: PipelinePolicy,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> AppResult<Self> {
        let analytics_api_base = std::env::var("ANALYTICS_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8010/api".into());

        let groq_api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let stats = StatsApiClient::new(analytics_api_base.clone())?;
        let schema = SchemaApiClient::new(analytics_api_base.clone())?;

        Ok(Self {
            analytics_api_base,
            groq_api_key,
            stats,
            schema,
            store: FsSnapshotStore::from_env(),
            policy: PipelinePolicy::from_env(),
        })
    }
}
