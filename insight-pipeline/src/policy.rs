//! Pipeline policy knobs.
//!
//! Two validation behaviors are deliberately configurable rather than fixed,
//! because the product's documented intent and its shipped behavior disagree
//! (see the matching tests in `gates.rs` and `pipeline.rs`):
//!
//! - weak numeric evidence (|correlation| below the low-confidence
//!   threshold): warn-and-pass vs suppress;
//! - causal phrasing in `whyItMatters` at validation time: defer to the
//!   sanitizer's rewrite pass vs reject the insight outright.

/// How to treat numeric factors whose |correlation| is below the
/// low-confidence threshold (0.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeakEvidenceMode {
    /// Log a warning and pass the insight through; confidence computes Low.
    #[default]
    WarnOnly,
    /// Drop the insight at the evidence gate.
    Suppress,
}

/// How to treat causal phrasing detected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CausalLanguageMode {
    /// Leave the text for the sanitizer, which rewrites causal verbs into
    /// association phrasing.
    #[default]
    RewriteLater,
    /// Reject the insight at validation time.
    RejectOnSight,
}

/// Aggregate policy for one pipeline instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelinePolicy {
    pub weak_evidence: WeakEvidenceMode,
    pub causal_language: CausalLanguageMode,
}

impl PipelinePolicy {
    /// Load from environment, defaulting to the shipped behavior.
    ///
    /// - `INSIGHT_WEAK_EVIDENCE` = `warn` (default) | `suppress`
    /// - `INSIGHT_CAUSAL_LANGUAGE` = `rewrite` (default) | `reject`
    pub fn from_env() -> Self {
        let weak_evidence = match std::env::var("INSIGHT_WEAK_EVIDENCE")
            .unwrap_or_else(|_| "warn".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "suppress" => WeakEvidenceMode::Suppress,
            _ => WeakEvidenceMode::WarnOnly,
        };
        let causal_language = match std::env::var("INSIGHT_CAUSAL_LANGUAGE")
            .unwrap_or_else(|_| "rewrite".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "reject" => CausalLanguageMode::RejectOnSight,
            _ => CausalLanguageMode::RewriteLater,
        };

        Self {
            weak_evidence,
            causal_language,
        }
    }
}
