//! Insight types at three trust levels.
//!
//! [`RawInsight`] is whatever the language model emitted: every field is
//! optional and loosely typed, because any of them may be fabricated,
//! missing, or the wrong JSON shape. [`ValidatedInsight`] is produced only
//! by the validation gates and carries a confirmed factor identity plus a
//! recomputed confidence. [`SanitizedInsight`] is produced only by the
//! sanitizer/capper and is the only insight type the response serializer
//! accepts, so untreated model text cannot reach a client by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stats::Confidence;

/// Untrusted top-level model payload.
///
/// `decision_metric` and `top_insights` are required for the payload to be
/// considered well-formed; the parser rejects documents lacking either.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInsightDoc {
    #[serde(default)]
    pub decision_metric: Option<String>,

    #[serde(default)]
    pub top_insights: Option<Vec<RawInsight>>,

    #[serde(default)]
    pub data_risks: Option<Vec<Value>>,

    #[serde(default)]
    pub limitations: Option<Value>,
}

/// One untrusted insight as emitted by the model.
///
/// `rank` and `confidence` are parsed but always discarded downstream; the
/// text fields stay as raw [`Value`]s until `ensure_string` coercion during
/// validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInsight {
    #[serde(default)]
    pub rank: Option<Value>,

    #[serde(default)]
    pub factor: Option<Value>,

    #[serde(default)]
    pub why_it_matters: Option<Value>,

    #[serde(default)]
    pub evidence: Option<Value>,

    #[serde(default)]
    pub confidence: Option<Value>,
}

impl RawInsight {
    /// The factor name, when the model supplied a plain string. Non-string
    /// factors count as missing and fail the allow-list gate.
    pub fn factor_name(&self) -> Option<&str> {
        match &self.factor {
            Some(Value::String(s)) => {
                let t = s.trim();
                (!t.is_empty()).then_some(t)
            }
            _ => None,
        }
    }
}

/// Insight that passed identity, evidence, and confidence validation.
///
/// Invariants: `factor` is a member of the approved factor set, `confidence`
/// was computed from backend statistics (never taken from the model), and
/// `rank` was assigned by the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedInsight {
    pub rank: u32,
    pub factor: String,
    pub why_it_matters: String,
    pub evidence: String,
    pub confidence: Confidence,
}

/// Final, client-facing insight.
///
/// Invariant: `why_it_matters` and `evidence` contain no forbidden-phrase
/// token; `confidence` has been capped by the dataset-size ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedInsight {
    pub rank: u32,
    pub factor: String,
    pub why_it_matters: String,
    pub evidence: String,
    pub confidence: Confidence,
    pub confidence_explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_string_factor_counts_as_missing() {
        let raw: RawInsight = serde_json::from_value(json!({
            "factor": ["marketing_spend", "region"],
            "whyItMatters": "combined effect"
        }))
        .unwrap();
        assert!(raw.factor_name().is_none());
    }

    #[test]
    fn blank_factor_counts_as_missing() {
        let raw: RawInsight = serde_json::from_value(json!({ "factor": "   " })).unwrap();
        assert!(raw.factor_name().is_none());
    }

    #[test]
    fn tolerates_arbitrary_field_shapes() {
        let raw: RawInsight = serde_json::from_value(json!({
            "rank": "first",
            "factor": "price",
            "whyItMatters": { "text": "nested" },
            "confidence": 0.99
        }))
        .unwrap();
        assert_eq!(raw.factor_name(), Some("price"));
    }
}
