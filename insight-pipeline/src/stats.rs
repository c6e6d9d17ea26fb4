//! Wire types for the precomputed dataset statistics.
//!
//! These mirror what the trusted analysis backend emits per run: ranked
//! factors, raw correlations, categorical segment impacts, and the columns
//! it excluded from analysis. The pipeline never computes any of these
//! numbers itself; it only reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether a factor column is numeric or categorical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorKind {
    Numeric,
    Categorical,
}

/// Per-factor statistical record from the analysis backend.
///
/// Numeric factors carry correlation fields; categorical factors carry
/// segment fields. `impact_score` is only present on ranked (`top_factors`)
/// records and is authoritative for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorStat {
    pub factor: String,

    #[serde(rename = "type")]
    pub kind: FactorKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_correlation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_difference: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_impact_pct: Option<f64>,

    /// Segment name → segment mean of the decision metric. BTreeMap keeps
    /// serialization order stable across runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_segments: Option<BTreeMap<String, f64>>,
}

impl FactorStat {
    /// Bare record with only identity fields set; used when tagging
    /// correlation/segment entries that lack a ranked counterpart.
    pub fn bare(factor: impl Into<String>, kind: FactorKind) -> Self {
        Self {
            factor: factor.into(),
            kind,
            impact_score: None,
            correlation: None,
            abs_correlation: None,
            mean_difference: None,
            relative_impact_pct: None,
            top_segments: None,
        }
    }
}

/// A column the analysis backend refused to analyze, with its reason
/// (identifier, URL, free text, high uniqueness, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedColumn {
    pub column: String,
    pub reason: String,
}

/// Immutable statistics input for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStats {
    pub decision_metric: String,

    pub total_rows: u64,

    #[serde(default)]
    pub valid_rows: u64,

    #[serde(default)]
    pub missing_percentage: f64,

    /// Ranked factors, each carrying an `impact_score`.
    #[serde(default)]
    pub top_factors: Vec<FactorStat>,

    #[serde(default)]
    pub all_correlations: Vec<FactorStat>,

    #[serde(default)]
    pub all_segment_impacts: Vec<FactorStat>,

    #[serde(default)]
    pub excluded_columns: Vec<ExcludedColumn>,
}

/// Confidence tier for an insight. Ordering matters: the capper takes a
/// `min` against a row-count ceiling, so `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_tiers_are_ordered() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(Confidence::High.min(Confidence::Medium), Confidence::Medium);
    }

    #[test]
    fn factor_stat_deserializes_backend_payload() {
        let json = r#"{
            "factor": "marketing_spend",
            "type": "numeric",
            "impactScore": 85.5,
            "correlation": 0.75,
            "absCorrelation": 0.75
        }"#;
        let stat: FactorStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.kind, FactorKind::Numeric);
        assert_eq!(stat.impact_score, Some(85.5));
        assert!(stat.top_segments.is_none());
    }
}
