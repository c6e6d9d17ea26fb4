//! HTTP client for the dataset-schema endpoint of the analysis backend.
//!
//! Consumed best-effort: when the schema service is down, the pipeline's
//! allow list degrades to the factor names present in the statistics.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use urlencoding::encode;

use insight_pipeline::{SchemaService, UpstreamError};

use crate::error_handler::AppResult;

#[derive(Debug, Clone)]
pub struct SchemaApiClient {
    client: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    columns: Vec<SchemaColumn>,
}

#[derive(Debug, Deserialize)]
struct SchemaColumn {
    name: String,
}

impl SchemaApiClient {
    pub fn new(base: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }
}

impl SchemaService for SchemaApiClient {
    async fn columns(
        &self,
        workspace_id: &str,
        dataset_id: &str,
    ) -> Result<Vec<String>, UpstreamError> {
        let url = format!(
            "{}/workspaces/{}/datasets/{}/schema",
            self.base,
            encode(workspace_id),
            encode(dataset_id)
        );
        debug!(%url, "GET dataset schema");

        let resp = self.client.get(&url).send().await.map_err(|e| UpstreamError {
            status: if e.is_timeout() { 504 } else { 502 },
            message: format!("schema service unreachable: {e}"),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError {
                status: status.as_u16(),
                message: format!("schema service returned {status}"),
            });
        }

        let schema: SchemaResponse = resp.json().await.map_err(|e| UpstreamError {
            status: 502,
            message: format!("schema payload unreadable: {e}"),
        })?;
        Ok(schema.columns.into_iter().map(|c| c.name).collect())
    }
}
