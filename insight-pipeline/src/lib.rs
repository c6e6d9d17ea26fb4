//! Insight validation & sanitization pipeline.
//!
//! Turns two inputs — precomputed dataset statistics from a trusted
//! analysis backend, and free-form JSON from an untrusted language model —
//! into a small, stably-ordered set of decision insights that are safe to
//! show to an end user.
//!
//! Stage order (fixed):
//!   1) `index`      — approved-factor set + per-factor stats lookup;
//!   2) `gates`      — factor identity and statistical evidence checks;
//!   3) `confidence` — tier computed from statistics only;
//!   4) `ranking`    — impact-score order, alphabetical tie-break;
//!   5) `snapshot`   — persisted result, delete-then-replace lifecycle;
//!   6) `sanitize`   — causal-language rewrite, number stripping, cap;
//!   7) `dedup`      — factor dedup + canned fallback.
//!
//! The orchestrator in [`pipeline`] composes these plus the collaborator
//! seams in [`collaborators`]. Everything is deterministic for fixed
//! inputs; the only side effect is best-effort snapshot persistence.

pub mod collaborators;
pub mod confidence;
pub mod dedup;
pub mod errors;
pub mod gates;
pub mod index;
pub mod insight;
pub mod parse;
pub mod pipeline;
pub mod policy;
pub mod prompt;
pub mod ranking;
pub mod sanitize;
pub mod snapshot;
pub mod stats;

pub use collaborators::{ModelClient, SchemaService, StatsBackend};
pub use errors::{InsightError, InsightResult, SnapshotError, UpstreamError};
pub use insight::{RawInsight, RawInsightDoc, SanitizedInsight, ValidatedInsight};
pub use pipeline::{GeneratedInsights, InsightPipeline, InsightRequest, PipelineOutcome};
pub use policy::{CausalLanguageMode, PipelinePolicy, WeakEvidenceMode};
pub use snapshot::{FsSnapshotStore, InsightSnapshot, SnapshotKey, SnapshotStore};
pub use stats::{BackendStats, Confidence, ExcludedColumn, FactorKind, FactorStat};
