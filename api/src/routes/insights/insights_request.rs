use serde::Deserialize;

use crate::core::http::response_envelope::ApiErrorDetail;

/// Request body for `POST /insights`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInsightsRequest {
    pub workspace_id: String,
    pub dataset_id: String,
    pub decision_metric: String,
    pub provider: String,
    pub model: String,

    /// Per-request override of the server-side Groq key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// When true, the prior snapshot is deleted and insights are rebuilt.
    #[serde(default)]
    pub regenerate: bool,
}

impl GenerateInsightsRequest {
    /// Field-level validation. Empty vec means the request is acceptable.
    pub fn validate(&self) -> Vec<ApiErrorDetail> {
        let mut details = Vec::new();

        for (path, value) in [
            ("workspaceId", &self.workspace_id),
            ("datasetId", &self.dataset_id),
            ("decisionMetric", &self.decision_metric),
            ("model", &self.model),
        ] {
            if value.trim().is_empty() {
                details.push(ApiErrorDetail {
                    path: Some(path.into()),
                    hint: Some("Value must be a non-empty string.".into()),
                });
            }
        }

        if !self.provider.trim().eq_ignore_ascii_case("groq") {
            details.push(ApiErrorDetail {
                path: Some("provider".into()),
                hint: Some("Only the \"groq\" provider is supported.".into()),
            });
        }

        details
    }
}
