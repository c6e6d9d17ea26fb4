//! Crate-wide error hierarchy for insight-pipeline.
//!
//! Goals:
//! - Single root [`InsightError`] for all public functions.
//! - Upstream-aware mapping (the statistics backend's status propagates).
//! - No dynamic dispatch, no async-trait, ergonomic `?` via `From` impls.

use thiserror::Error;

use ai_llm_service::AiLlmError;

/// Convenient alias for crate-wide results.
pub type InsightResult<T> = Result<T, InsightError>;

/// Root error type for the insight pipeline.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Statistics backend failure; the upstream status propagates to the
    /// HTTP layer unchanged.
    #[error("statistics backend failed with status {status}: {message}")]
    UpstreamCompute { status: u16, message: String },

    /// Language-model call failed, including after the single
    /// default-model fallback attempt.
    #[error(transparent)]
    Model(#[from] AiLlmError),

    /// Model response was not parseable JSON or lacked the required
    /// fields; carries a truncated raw excerpt for diagnosis.
    #[error("model output could not be interpreted as insights: {excerpt}")]
    MalformedModelOutput { excerpt: String },

    /// Every insight was rejected by the gates; the message carries
    /// actionable row-count/schema/evidence guidance.
    #[error("{0}")]
    NoValidInsights(String),

    /// Snapshot store failure. Persistence itself is best-effort and never
    /// surfaces this; only explicit load paths do.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Snapshot store (file I/O / JSON) failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure reported by an upstream collaborator (statistics engine or
/// schema service).
#[derive(Debug, Error)]
#[error("upstream returned status {status}: {message}")]
pub struct UpstreamError {
    pub status: u16,
    pub message: String,
}

impl From<UpstreamError> for InsightError {
    fn from(e: UpstreamError) -> Self {
        InsightError::UpstreamCompute {
            status: e.status,
            message: e.message,
        }
    }
}
