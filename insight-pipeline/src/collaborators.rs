//! Interfaces the pipeline consumes but does not implement.
//!
//! The statistics engine, the schema service, and the language-model call
//! are external collaborators: each owns its own timeouts and retries. The
//! pipeline is pure given these three inputs (plus the snapshot store seam
//! in `snapshot.rs`). Native `async` trait methods via `impl Future`; no
//! dynamic dispatch, no async-trait.

use std::future::Future;

use ai_llm_service::{AiLlmError, ChatMessage, GroqService};

use crate::errors::UpstreamError;
use crate::stats::BackendStats;

/// Trusted analysis backend: computes statistics and fingerprints datasets.
pub trait StatsBackend: Send + Sync {
    fn compute_stats(
        &self,
        workspace_id: &str,
        dataset_id: &str,
        decision_metric: &str,
    ) -> impl Future<Output = Result<BackendStats, UpstreamError>> + Send;

    /// Content fingerprint of the live dataset; drives snapshot
    /// invalidation.
    fn dataset_fingerprint(
        &self,
        workspace_id: &str,
        dataset_id: &str,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

/// Dataset-schema service. Best-effort: when it fails, the allow list
/// degrades to the factor names present in the statistics.
pub trait SchemaService: Send + Sync {
    fn columns(
        &self,
        workspace_id: &str,
        dataset_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, UpstreamError>> + Send;
}

/// Language-model completion call.
pub trait ModelClient: Send + Sync {
    fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;
}

impl ModelClient for GroqService {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        self.generate(model, messages).await
    }
}
