use serde::Serialize;

use insight_pipeline::{BackendStats, ExcludedColumn, GeneratedInsights, PipelineOutcome};

/// Success payload for `POST /insights` (wrapped in the response envelope).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInsightsResponse {
    pub insights: GeneratedInsights,
    pub backend_stats: BackendStats,
    pub excluded_columns: Vec<ExcludedColumn>,
    pub cached: bool,
}

impl From<PipelineOutcome> for GenerateInsightsResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            excluded_columns: outcome.backend_stats.excluded_columns.clone(),
            insights: outcome.insights,
            backend_stats: outcome.backend_stats,
            cached: outcome.cached,
        }
    }
}
