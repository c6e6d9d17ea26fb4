//! Pipeline orchestrator.
//!
//! Flow (fixed order):
//!   1) CacheCheck — skipped on regeneration; a hit requires a matching
//!      dataset fingerprint, anything stale is invalidated;
//!   2) ComputeStats + best-effort schema fetch → factor index;
//!   3) LLMCall — single attempt plus one default-model fallback when the
//!      requested model id no longer exists;
//!   4) Validate — allow-list → evidence → confidence gates, then ranking;
//!   5) Persist — fire-and-forget snapshot write (delete-then-replace
//!      semantics on regeneration);
//!   6) Sanitize — text rewrite, confidence cap, dedup, fallback injection;
//!   7) Respond.
//!
//! The sanitize stages run on every respond path, cached or fresh; they are
//! deterministic, so replaying them over a stored snapshot yields the same
//! bytes. Concurrent regenerations of one key are not serialized: the store
//! exhibits last-writer-wins, which is a documented limitation.
//!
//! Logs:
//! - `INFO`: final summary (#insights, cached flag, timing)
//! - `DEBUG`: per-insight gate decisions
//! - `WARN`: recovered failures (schema fetch, snapshot persistence)

use std::time::Instant;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use ai_llm_service::DEFAULT_GROQ_MODEL;

use crate::collaborators::{ModelClient, SchemaService, StatsBackend};
use crate::dedup;
use crate::errors::{InsightError, InsightResult};
use crate::gates::{self, RejectReason};
use crate::index::FactorStatsIndex;
use crate::insight::{RawInsight, SanitizedInsight, ValidatedInsight};
use crate::parse;
use crate::policy::{CausalLanguageMode, PipelinePolicy};
use crate::prompt;
use crate::ranking;
use crate::sanitize::{
    self, EVIDENCE_FALLBACK, NEUTRAL_WHY_FALLBACK, ensure_string,
};
use crate::snapshot::{InsightSnapshot, SnapshotKey, SnapshotStore};
use crate::stats::BackendStats;

/// Fixed limitations sentence used when the model supplies none.
pub const DEFAULT_LIMITATIONS: &str =
    "Associations reflect patterns in this dataset and are not proof of a mechanism.";

/// One insight-generation request, already field-validated by the HTTP
/// layer.
#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub workspace_id: String,
    pub dataset_id: String,
    pub decision_metric: String,
    pub model: String,
    pub regenerate: bool,
}

impl InsightRequest {
    fn key(&self) -> SnapshotKey {
        SnapshotKey {
            workspace_id: self.workspace_id.clone(),
            dataset_id: self.dataset_id.clone(),
            decision_metric: self.decision_metric.clone(),
        }
    }
}

/// Client-facing insight block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInsights {
    pub decision_metric: String,
    pub top_insights: Vec<SanitizedInsight>,
    pub data_risks: Vec<String>,
    pub limitations: String,
}

/// Full pipeline result for one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub insights: GeneratedInsights,
    pub backend_stats: BackendStats,
    pub cached: bool,
}

/// The orchestrator. Borrows its four collaborators; owns only policy.
pub struct InsightPipeline<'a, S, C, M, P>
where
    S: StatsBackend,
    C: SchemaService,
    M: ModelClient,
    P: SnapshotStore,
{
    pub stats: &'a S,
    pub schema: &'a C,
    pub model: &'a M,
    pub store: &'a P,
    pub policy: PipelinePolicy,
}

impl<'a, S, C, M, P> InsightPipeline<'a, S, C, M, P>
where
    S: StatsBackend,
    C: SchemaService,
    M: ModelClient,
    P: SnapshotStore,
{
    pub fn new(stats: &'a S, schema: &'a C, model: &'a M, store: &'a P) -> Self {
        Self {
            stats,
            schema,
            model,
            store,
            policy: PipelinePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PipelinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the full pipeline for one request.
    pub async fn run(&self, req: &InsightRequest) -> InsightResult<PipelineOutcome> {
        let t0 = Instant::now();
        let key = req.key();
        let mut prior: Option<InsightSnapshot> = None;

        if req.regenerate {
            // Delete-then-replace. The old insights are read only so their
            // wording can feed the do-not-reuse list in the prompt.
            match self.store.load(&key).await {
                Ok(found) => prior = found,
                Err(e) => warn!(error = %e, "prior snapshot load failed; regenerating blind"),
            }
            if prior.is_some() {
                if let Err(e) = self.store.delete(&key).await {
                    warn!(error = %e, "prior snapshot delete failed; continuing");
                }
            }
        } else {
            match self.store.load(&key).await {
                Ok(Some(snapshot)) => match self
                    .stats
                    .dataset_fingerprint(&req.workspace_id, &req.dataset_id)
                    .await
                {
                    Ok(live_hash) if live_hash == snapshot.dataset_hash => {
                        info!(
                            version = snapshot.version,
                            elapsed_ms = t0.elapsed().as_millis() as u64,
                            "serving cached snapshot"
                        );
                        return Ok(self.respond(snapshot, true));
                    }
                    Ok(_) => {
                        debug!(version = snapshot.version, "snapshot stale; invalidating");
                        prior = Some(snapshot);
                        if let Err(e) = self.store.delete(&key).await {
                            warn!(error = %e, "stale snapshot delete failed; continuing");
                        }
                    }
                    Err(e) => {
                        // Cannot verify freshness; treat as changed.
                        warn!(error = %e, "dataset fingerprint unavailable; bypassing cache");
                        prior = Some(snapshot);
                    }
                },
                Ok(None) => {}
                Err(e) => warn!(error = %e, "snapshot load failed; generating fresh"),
            }
        }

        // ComputeStats + schema → factor index.
        let backend_stats = self
            .stats
            .compute_stats(&req.workspace_id, &req.dataset_id, &req.decision_metric)
            .await?;

        let schema_columns = match self.schema.columns(&req.workspace_id, &req.dataset_id).await {
            Ok(columns) => Some(columns),
            Err(e) => {
                warn!(error = %e, "schema fetch failed; allow list falls back to stats");
                None
            }
        };
        let index = FactorStatsIndex::build(&backend_stats, schema_columns.as_deref());

        // LLMCall with the single decommissioned-model fallback.
        let prior_sentences: Vec<String> = prior
            .as_ref()
            .map(|p| p.insights.iter().map(|i| i.why_it_matters.clone()).collect())
            .unwrap_or_default();
        let messages = prompt::build_messages(&backend_stats, &prior_sentences);

        let raw = match self.model.complete(&req.model, &messages).await {
            Ok(raw) => raw,
            Err(e) if e.is_model_not_found() && req.model != DEFAULT_GROQ_MODEL => {
                warn!(
                    requested = %req.model,
                    fallback = DEFAULT_GROQ_MODEL,
                    "requested model unavailable; retrying once with the default"
                );
                self.model.complete(DEFAULT_GROQ_MODEL, &messages).await?
            }
            Err(e) => return Err(e.into()),
        };

        let doc = parse::parse_model_output(&raw)?;
        if doc.decision_metric != backend_stats.decision_metric {
            debug!(
                model_metric = %doc.decision_metric,
                backend_metric = %backend_stats.decision_metric,
                "model renamed the decision metric; backend name wins"
            );
        }

        // Validate. The row-count check is batch-level and fail-fast.
        gates::batch_evidence_check(backend_stats.total_rows)
            .map_err(InsightError::NoValidInsights)?;

        let validated = self.validate_batch(&doc.insights, &index);
        let ranked = ranking::rank_insights(validated, &index);
        if ranked.is_empty() {
            return Err(InsightError::NoValidInsights(format!(
                "no insights survived validation for '{}': check that the dataset has at least {} rows, \
                 that the schema lists the analyzed columns, and that factors show non-zero \
                 correlations or segment differences",
                req.decision_metric,
                gates::MIN_ROWS_FOR_INSIGHTS
            )));
        }

        let data_risks: Vec<String> = doc
            .data_risks
            .iter()
            .filter_map(|v| sanitize::sanitize_free_text(&ensure_string(Some(v), "")))
            .collect();
        let limitations = doc
            .limitations
            .as_ref()
            .and_then(|v| sanitize::sanitize_free_text(&ensure_string(Some(v), "")))
            .unwrap_or_else(|| DEFAULT_LIMITATIONS.to_string());

        // Persist (fire-and-forget; the response never depends on it).
        let snapshot = self
            .build_snapshot(req, &prior, backend_stats, ranked, data_risks, limitations)
            .await;
        if let Err(e) = self.store.save(&key, &snapshot).await {
            warn!(error = %e, "snapshot persistence failed; response unaffected");
        }

        let outcome = self.respond(snapshot, false);
        info!(
            insights = outcome.insights.top_insights.len(),
            regenerated = req.regenerate,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "insight pipeline completed"
        );
        Ok(outcome)
    }

    /// Per-insight gate loop: allow-list → evidence → content policy →
    /// confidence. Text fields are coerced to scalar strings here so every
    /// later stage works on plain `String`s.
    fn validate_batch(
        &self,
        raw_insights: &[RawInsight],
        index: &FactorStatsIndex,
    ) -> Vec<ValidatedInsight> {
        let mut validated = Vec::with_capacity(raw_insights.len());

        for (i, raw) in raw_insights.iter().enumerate() {
            let factor = raw.factor_name();

            if let Err(reason) = gates::allow_list_gate(factor, index) {
                debug!(idx = i, reason = reason.as_str(), "insight dropped");
                continue;
            }
            let factor = factor.unwrap_or_default().to_string();

            let stat = index.stat(&factor);
            if let Err(reason) = gates::evidence_gate(stat, self.policy.weak_evidence) {
                debug!(idx = i, factor = %factor, reason = reason.as_str(), "insight dropped");
                continue;
            }

            let why_it_matters =
                ensure_string(raw.why_it_matters.as_ref(), NEUTRAL_WHY_FALLBACK);
            if self.policy.causal_language == CausalLanguageMode::RejectOnSight
                && sanitize::contains_forbidden_phrase(&why_it_matters)
            {
                debug!(
                    idx = i,
                    factor = %factor,
                    reason = RejectReason::CausalLanguage.as_str(),
                    "insight dropped"
                );
                continue;
            }

            // The model's confidence is discarded unconditionally.
            let confidence = stat
                .map(crate::confidence::compute_confidence)
                .unwrap_or(crate::stats::Confidence::Low);

            validated.push(ValidatedInsight {
                rank: 0, // assigned by the ranker
                factor,
                why_it_matters,
                evidence: ensure_string(raw.evidence.as_ref(), EVIDENCE_FALLBACK),
                confidence,
            });
        }

        debug!(
            accepted = validated.len(),
            received = raw_insights.len(),
            "validation complete"
        );
        validated
    }

    async fn build_snapshot(
        &self,
        req: &InsightRequest,
        prior: &Option<InsightSnapshot>,
        backend_stats: BackendStats,
        insights: Vec<ValidatedInsight>,
        data_risks: Vec<String>,
        limitations: String,
    ) -> InsightSnapshot {
        let dataset_hash = match self
            .stats
            .dataset_fingerprint(&req.workspace_id, &req.dataset_id)
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                // Keyed fallback hash; the next cache check will miss and
                // regenerate, which is the safe direction.
                warn!(error = %e, "dataset fingerprint unavailable; storing fallback hash");
                let mut hasher = Sha256::new();
                hasher.update(format!("{}:{}", req.workspace_id, req.dataset_id));
                format!("{:x}", hasher.finalize())
            }
        };

        InsightSnapshot {
            version: prior.as_ref().map(|p| p.version + 1).unwrap_or(1),
            workspace_id: req.workspace_id.clone(),
            dataset_id: req.dataset_id.clone(),
            decision_metric: req.decision_metric.clone(),
            dataset_hash,
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            backend_stats,
            insights,
            data_risks,
            limitations,
        }
    }

    /// Shared respond path: sanitize → cap → dedup → fallback over a
    /// snapshot, fresh or loaded from the store.
    fn respond(&self, snapshot: InsightSnapshot, cached: bool) -> PipelineOutcome {
        let index = FactorStatsIndex::build(&snapshot.backend_stats, None);
        let total_rows = snapshot.backend_stats.total_rows;

        let sanitized: Vec<SanitizedInsight> = snapshot
            .insights
            .iter()
            .filter_map(|i| sanitize::sanitize_and_cap(i, &index, total_rows))
            .collect();
        let top_insights = dedup::finalize(sanitized, total_rows);

        PipelineOutcome {
            insights: GeneratedInsights {
                decision_metric: snapshot.backend_stats.decision_metric.clone(),
                top_insights,
                data_risks: snapshot.data_risks,
                limitations: snapshot.limitations,
            },
            backend_stats: snapshot.backend_stats,
            cached,
        }
    }
}
