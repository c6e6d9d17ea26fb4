//! Identity and evidence gates for untrusted insights.
//!
//! Each gate either passes an insight or drops it with a logged reason.
//! The row-count evidence pre-check is batch-level and runs once per
//! request, before the per-insight loop.

use tracing::{debug, warn};

use crate::index::FactorStatsIndex;
use crate::policy::WeakEvidenceMode;
use crate::stats::{FactorKind, FactorStat};

/// Minimum dataset size for any insight generation.
pub const MIN_ROWS_FOR_INSIGHTS: u64 = 50;

/// |correlation| below this computes Low confidence; the weak-evidence
/// policy decides whether such factors are additionally suppressed.
pub const WEAK_CORRELATION_THRESHOLD: f64 = 0.10;

/// Why a gate dropped an insight. Logged, never surfaced per-insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyFactor,
    SyntheticFactor,
    UnknownFactor,
    MissingStat,
    DegenerateEvidence,
    WeakEvidence,
    CausalLanguage,
}

impl RejectReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RejectReason::EmptyFactor => "factor name missing or empty",
            RejectReason::SyntheticFactor => "factor name looks synthesized or combined",
            RejectReason::UnknownFactor => "factor not in the approved set",
            RejectReason::MissingStat => "no statistical record for factor",
            RejectReason::DegenerateEvidence => "statistic absent, non-finite, or zero-effect",
            RejectReason::WeakEvidence => "correlation below the evidence threshold",
            RejectReason::CausalLanguage => "causal phrasing rejected by policy",
        }
    }
}

/// Heuristic for compound/derived feature names the model may have invented
/// by combining real columns: embedded spaces, arithmetic operators, or an
/// implausibly long multi-underscore identifier.
pub fn looks_synthesized(factor: &str) -> bool {
    if factor.contains(' ') {
        return true;
    }
    if factor.contains(['+', '-', '*', '/']) {
        return true;
    }
    factor.matches('_').count() > 1 && factor.len() > 20
}

/// Identity gate: the factor must be present, plausible, and approved.
pub fn allow_list_gate(
    factor: Option<&str>,
    index: &FactorStatsIndex,
) -> Result<(), RejectReason> {
    let factor = match factor {
        Some(f) => f,
        None => return Err(RejectReason::EmptyFactor),
    };
    if looks_synthesized(factor) {
        return Err(RejectReason::SyntheticFactor);
    }
    if !index.is_approved(factor) {
        return Err(RejectReason::UnknownFactor);
    }
    Ok(())
}

/// Batch-level evidence pre-check. Failing it rejects the whole request.
pub fn batch_evidence_check(total_rows: u64) -> Result<(), String> {
    if total_rows < MIN_ROWS_FOR_INSIGHTS {
        return Err(format!(
            "dataset has {total_rows} rows; at least {MIN_ROWS_FOR_INSIGHTS} are required for insight generation"
        ));
    }
    Ok(())
}

/// Per-insight evidence gate over the factor's statistical record.
///
/// Numeric factors need a finite, non-zero |correlation|; categorical
/// factors need a finite mean difference. Anything else is degenerate.
pub fn evidence_gate(
    stat: Option<&FactorStat>,
    weak_evidence: WeakEvidenceMode,
) -> Result<(), RejectReason> {
    let stat = stat.ok_or(RejectReason::MissingStat)?;

    match stat.kind {
        FactorKind::Numeric => {
            let corr = stat
                .abs_correlation
                .ok_or(RejectReason::DegenerateEvidence)?;
            if !corr.is_finite() || corr == 0.0 {
                return Err(RejectReason::DegenerateEvidence);
            }
            if corr.abs() < WEAK_CORRELATION_THRESHOLD {
                match weak_evidence {
                    WeakEvidenceMode::Suppress => {
                        debug!(factor = %stat.factor, corr, "weak correlation suppressed");
                        return Err(RejectReason::WeakEvidence);
                    }
                    WeakEvidenceMode::WarnOnly => {
                        warn!(
                            factor = %stat.factor,
                            corr,
                            "correlation below evidence threshold; passing through as low confidence"
                        );
                    }
                }
            }
            Ok(())
        }
        FactorKind::Categorical => {
            let diff = stat
                .mean_difference
                .ok_or(RejectReason::DegenerateEvidence)?;
            if !diff.is_finite() {
                return Err(RejectReason::DegenerateEvidence);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BackendStats, FactorKind, FactorStat};

    fn index_with(factors: &[FactorStat]) -> FactorStatsIndex {
        let backend = BackendStats {
            decision_metric: "revenue".into(),
            total_rows: 1000,
            valid_rows: 1000,
            missing_percentage: 0.0,
            top_factors: factors.to_vec(),
            all_correlations: vec![],
            all_segment_impacts: vec![],
            excluded_columns: vec![],
        };
        FactorStatsIndex::build(&backend, None)
    }

    #[test]
    fn synthesized_names_are_detected() {
        assert!(looks_synthesized("marketing_spend region"));
        assert!(looks_synthesized("region+marketing"));
        assert!(looks_synthesized("a*b"));
        assert!(looks_synthesized("price/quantity"));
        assert!(looks_synthesized("some_very_long_derived_feature_name"));
        assert!(!looks_synthesized("marketing_spend"));
        assert!(!looks_synthesized("region"));
    }

    #[test]
    fn allow_list_gate_drops_the_known_bad_inputs() {
        let idx = index_with(&[FactorStat {
            abs_correlation: Some(0.5),
            ..FactorStat::bare("marketing_spend", FactorKind::Numeric)
        }]);

        assert_eq!(
            allow_list_gate(Some("marketing_spend region"), &idx),
            Err(RejectReason::SyntheticFactor)
        );
        assert_eq!(
            allow_list_gate(Some("region+marketing"), &idx),
            Err(RejectReason::SyntheticFactor)
        );
        assert_eq!(
            allow_list_gate(Some("unknown_feature"), &idx),
            Err(RejectReason::UnknownFactor)
        );
        assert_eq!(allow_list_gate(None, &idx), Err(RejectReason::EmptyFactor));
        assert_eq!(allow_list_gate(Some("marketing_spend"), &idx), Ok(()));
    }

    #[test]
    fn batch_check_enforces_minimum_rows() {
        assert!(batch_evidence_check(49).is_err());
        assert!(batch_evidence_check(50).is_ok());
    }

    #[test]
    fn numeric_evidence_requires_finite_nonzero_correlation() {
        let ok = FactorStat {
            abs_correlation: Some(0.4),
            ..FactorStat::bare("price", FactorKind::Numeric)
        };
        assert_eq!(evidence_gate(Some(&ok), WeakEvidenceMode::WarnOnly), Ok(()));

        let zero = FactorStat {
            abs_correlation: Some(0.0),
            ..FactorStat::bare("price", FactorKind::Numeric)
        };
        assert_eq!(
            evidence_gate(Some(&zero), WeakEvidenceMode::WarnOnly),
            Err(RejectReason::DegenerateEvidence)
        );

        let nan = FactorStat {
            abs_correlation: Some(f64::NAN),
            ..FactorStat::bare("price", FactorKind::Numeric)
        };
        assert_eq!(
            evidence_gate(Some(&nan), WeakEvidenceMode::WarnOnly),
            Err(RejectReason::DegenerateEvidence)
        );

        let missing = FactorStat::bare("price", FactorKind::Numeric);
        assert_eq!(
            evidence_gate(Some(&missing), WeakEvidenceMode::WarnOnly),
            Err(RejectReason::DegenerateEvidence)
        );

        assert_eq!(
            evidence_gate(None, WeakEvidenceMode::WarnOnly),
            Err(RejectReason::MissingStat)
        );
    }

    #[test]
    fn categorical_evidence_requires_finite_mean_difference() {
        let ok = FactorStat {
            mean_difference: Some(0.08),
            ..FactorStat::bare("region", FactorKind::Categorical)
        };
        assert_eq!(evidence_gate(Some(&ok), WeakEvidenceMode::WarnOnly), Ok(()));

        let missing = FactorStat::bare("region", FactorKind::Categorical);
        assert_eq!(
            evidence_gate(Some(&missing), WeakEvidenceMode::WarnOnly),
            Err(RejectReason::DegenerateEvidence)
        );
    }

    // The two weak-evidence behaviors below document a real divergence:
    // the shipped gate warns and passes a 0.05 correlation through, while
    // the product's companion expectations say it should be suppressed.
    // Both are kept behind `WeakEvidenceMode` instead of guessing.
    #[test]
    fn weak_correlation_passes_under_warn_only() {
        let weak = FactorStat {
            abs_correlation: Some(0.05),
            ..FactorStat::bare("noise_col", FactorKind::Numeric)
        };
        assert_eq!(
            evidence_gate(Some(&weak), WeakEvidenceMode::WarnOnly),
            Ok(())
        );
    }

    #[test]
    fn weak_correlation_dropped_under_suppress() {
        let weak = FactorStat {
            abs_correlation: Some(0.05),
            ..FactorStat::bare("noise_col", FactorKind::Numeric)
        };
        assert_eq!(
            evidence_gate(Some(&weak), WeakEvidenceMode::Suppress),
            Err(RejectReason::WeakEvidence)
        );
    }
}
