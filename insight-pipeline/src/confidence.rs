//! Deterministic confidence scoring and the dataset-size ceiling.
//!
//! Confidence is derived only from backend statistics; whatever tier the
//! model claimed is discarded before this module runs. The row-count ceiling
//! is a second, independent bound that can only lower a tier.

use crate::stats::{Confidence, FactorKind, FactorStat};

/// |correlation| at or above this is Medium.
pub const NUMERIC_MEDIUM_THRESHOLD: f64 = 0.10;
/// |correlation| at or above this is High.
pub const NUMERIC_HIGH_THRESHOLD: f64 = 0.30;

pub const CATEGORICAL_HIGH_IMPACT_PCT: f64 = 20.0;
pub const CATEGORICAL_HIGH_MEAN_DIFF: f64 = 0.1;
pub const CATEGORICAL_MEDIUM_IMPACT_PCT: f64 = 10.0;
pub const CATEGORICAL_MEDIUM_MEAN_DIFF: f64 = 0.05;

/// Computes the confidence tier from a factor's statistical record.
///
/// Sample size never raises confidence here; it only lowers it later via
/// [`max_confidence_for_rows`].
pub fn compute_confidence(stat: &FactorStat) -> Confidence {
    match stat.kind {
        FactorKind::Numeric => {
            let corr = stat.abs_correlation.unwrap_or(0.0).abs();
            if corr >= NUMERIC_HIGH_THRESHOLD {
                Confidence::High
            } else if corr >= NUMERIC_MEDIUM_THRESHOLD {
                Confidence::Medium
            } else {
                Confidence::Low
            }
        }
        FactorKind::Categorical => {
            let impact = stat.relative_impact_pct.unwrap_or(0.0);
            let diff = stat.mean_difference.unwrap_or(0.0);
            if impact > CATEGORICAL_HIGH_IMPACT_PCT || diff > CATEGORICAL_HIGH_MEAN_DIFF {
                Confidence::High
            } else if impact > CATEGORICAL_MEDIUM_IMPACT_PCT || diff > CATEGORICAL_MEDIUM_MEAN_DIFF
            {
                Confidence::Medium
            } else {
                Confidence::Low
            }
        }
    }
}

/// Dataset-size ceiling: small samples cannot carry high confidence no
/// matter how strong the statistic looks.
pub fn max_confidence_for_rows(total_rows: u64) -> Confidence {
    if total_rows < 30 {
        Confidence::Low
    } else if total_rows < 100 {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

/// Applies the ceiling; never upgrades.
pub fn cap_confidence(confidence: Confidence, total_rows: u64) -> Confidence {
    confidence.min(max_confidence_for_rows(total_rows))
}

/// Human-readable explanation of the final tier. Purely descriptive; no
/// gate reads this.
pub fn confidence_explanation(
    confidence: Confidence,
    total_rows: u64,
    stat: Option<&FactorStat>,
) -> String {
    let tier = match confidence {
        Confidence::High => "High",
        Confidence::Medium => "Medium",
        Confidence::Low => "Low",
    };
    let mut text = format!("{tier} confidence based on {total_rows} rows");
    if let Some(stat) = stat {
        if stat.kind == FactorKind::Categorical {
            if let Some(segments) = &stat.top_segments {
                if !segments.is_empty() {
                    text.push_str(&format!(
                        " and consistent differences across {} segments",
                        segments.len()
                    ));
                }
            }
        }
    }
    text.push('.');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FactorStat;
    use std::collections::BTreeMap;

    fn numeric(corr: f64) -> FactorStat {
        FactorStat {
            abs_correlation: Some(corr),
            ..FactorStat::bare("f", FactorKind::Numeric)
        }
    }

    fn categorical(impact: f64, diff: f64) -> FactorStat {
        FactorStat {
            relative_impact_pct: Some(impact),
            mean_difference: Some(diff),
            ..FactorStat::bare("g", FactorKind::Categorical)
        }
    }

    #[test]
    fn numeric_tiers_follow_correlation_bands() {
        assert_eq!(compute_confidence(&numeric(0.75)), Confidence::High);
        assert_eq!(compute_confidence(&numeric(0.30)), Confidence::High);
        assert_eq!(compute_confidence(&numeric(0.25)), Confidence::Medium);
        assert_eq!(compute_confidence(&numeric(0.10)), Confidence::Medium);
        // Weak evidence still computes Low here; suppression is a separate
        // policy decision at the evidence gate.
        assert_eq!(compute_confidence(&numeric(0.08)), Confidence::Low);
    }

    #[test]
    fn categorical_tiers_follow_impact_and_mean_difference() {
        assert_eq!(compute_confidence(&categorical(25.0, 0.0)), Confidence::High);
        assert_eq!(compute_confidence(&categorical(0.0, 0.2)), Confidence::High);
        assert_eq!(
            compute_confidence(&categorical(12.0, 0.0)),
            Confidence::Medium
        );
        assert_eq!(
            compute_confidence(&categorical(0.0, 0.06)),
            Confidence::Medium
        );
        assert_eq!(compute_confidence(&categorical(5.0, 0.01)), Confidence::Low);
    }

    #[test]
    fn ceiling_tracks_row_count() {
        assert_eq!(max_confidence_for_rows(29), Confidence::Low);
        assert_eq!(max_confidence_for_rows(30), Confidence::Medium);
        assert_eq!(max_confidence_for_rows(99), Confidence::Medium);
        assert_eq!(max_confidence_for_rows(100), Confidence::High);
    }

    #[test]
    fn cap_never_upgrades() {
        assert_eq!(cap_confidence(Confidence::High, 80), Confidence::Medium);
        assert_eq!(cap_confidence(Confidence::Low, 10_000), Confidence::Low);
        assert_eq!(cap_confidence(Confidence::High, 1_000), Confidence::High);
    }

    #[test]
    fn explanation_mentions_tier_rows_and_segments() {
        let mut segs = BTreeMap::new();
        segs.insert("EU".to_string(), 120.0);
        segs.insert("US".to_string(), 80.0);
        let stat = FactorStat {
            top_segments: Some(segs),
            ..categorical(25.0, 0.3)
        };
        let text = confidence_explanation(Confidence::High, 1000, Some(&stat));
        assert_eq!(
            text,
            "High confidence based on 1000 rows and consistent differences across 2 segments."
        );

        let text = confidence_explanation(Confidence::Low, 60, None);
        assert_eq!(text, "Low confidence based on 60 rows.");
    }
}
