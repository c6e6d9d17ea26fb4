//! HTTP client for the statistics endpoints of the analysis backend.
//!
//! Endpoints consumed:
//! - GET {base}/workspaces/{ws}/datasets/{ds}/decision-stats?metric={m}
//! - GET {base}/workspaces/{ws}/datasets/{ds}/fingerprint
//!
//! The backend owns its own timeouts/retries; this client only maps
//! transport and status failures into `UpstreamError` so the pipeline can
//! propagate the upstream status unchanged.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use urlencoding::encode;

use insight_pipeline::{BackendStats, StatsBackend, UpstreamError};

use crate::error_handler::AppResult;

#[derive(Debug, Clone)]
pub struct StatsApiClient {
    client: reqwest::Client,
    base: String,
}

impl StatsApiClient {
    pub fn new(base: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, UpstreamError> {
        debug!(%url, "GET analysis backend");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(UpstreamError {
                status: status.as_u16(),
                message: short(&message),
            });
        }

        resp.json::<T>().await.map_err(|e| UpstreamError {
            status: 502,
            message: format!("analysis backend returned an unreadable payload: {e}"),
        })
    }
}

fn transport_error(e: reqwest::Error) -> UpstreamError {
    UpstreamError {
        status: if e.is_timeout() { 504 } else { 502 },
        message: format!("analysis backend unreachable: {e}"),
    }
}

fn short(message: &str) -> String {
    let collapsed: String = message.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(300).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintResponse {
    dataset_hash: String,
}

impl StatsBackend for StatsApiClient {
    async fn compute_stats(
        &self,
        workspace_id: &str,
        dataset_id: &str,
        decision_metric: &str,
    ) -> Result<BackendStats, UpstreamError> {
        let url = format!(
            "{}/workspaces/{}/datasets/{}/decision-stats?metric={}",
            self.base,
            encode(workspace_id),
            encode(dataset_id),
            encode(decision_metric)
        );
        self.get_json(url).await
    }

    async fn dataset_fingerprint(
        &self,
        workspace_id: &str,
        dataset_id: &str,
    ) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/workspaces/{}/datasets/{}/fingerprint",
            self.base,
            encode(workspace_id),
            encode(dataset_id)
        );
        let out: FingerprintResponse = self.get_json(url).await?;
        Ok(out.dataset_hash)
    }
}
