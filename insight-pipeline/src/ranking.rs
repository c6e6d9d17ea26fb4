//! Deterministic ordering of validated insights.
//!
//! The backend-supplied impact score is the only ranking signal; whatever
//! rank the model claimed was discarded during parsing. Ties resolve
//! alphabetically by factor name so repeated runs produce identical order.

use crate::index::FactorStatsIndex;
use crate::insight::ValidatedInsight;

/// Sorts by impact score descending (name ascending on ties) and reassigns
/// contiguous ranks starting at 1.
pub fn rank_insights(
    mut insights: Vec<ValidatedInsight>,
    index: &FactorStatsIndex,
) -> Vec<ValidatedInsight> {
    let impact_of = |factor: &str| -> f64 {
        index
            .stat(factor)
            .and_then(|s| s.impact_score)
            .unwrap_or(0.0)
    };

    insights.sort_by(|a, b| {
        impact_of(&b.factor)
            .total_cmp(&impact_of(&a.factor))
            .then_with(|| a.factor.cmp(&b.factor))
    });

    for (i, insight) in insights.iter_mut().enumerate() {
        insight.rank = (i + 1) as u32;
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BackendStats, Confidence, FactorKind, FactorStat};

    fn index(factors: &[(&str, f64)]) -> FactorStatsIndex {
        let backend = BackendStats {
            decision_metric: "revenue".into(),
            total_rows: 1000,
            valid_rows: 1000,
            missing_percentage: 0.0,
            top_factors: factors
                .iter()
                .map(|(name, impact)| FactorStat {
                    impact_score: Some(*impact),
                    abs_correlation: Some(0.5),
                    ..FactorStat::bare(*name, FactorKind::Numeric)
                })
                .collect(),
            all_correlations: vec![],
            all_segment_impacts: vec![],
            excluded_columns: vec![],
        };
        FactorStatsIndex::build(&backend, None)
    }

    fn validated(factor: &str, rank: u32) -> ValidatedInsight {
        ValidatedInsight {
            rank,
            factor: factor.into(),
            why_it_matters: "pattern".into(),
            evidence: "stat".into(),
            confidence: Confidence::Medium,
        }
    }

    #[test]
    fn orders_by_impact_descending() {
        let idx = index(&[("price", 40.0), ("marketing_spend", 85.5)]);
        let ranked = rank_insights(
            vec![validated("price", 9), validated("marketing_spend", 9)],
            &idx,
        );
        assert_eq!(ranked[0].factor, "marketing_spend");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].factor, "price");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn equal_impact_resolves_alphabetically() {
        let idx = index(&[("zebra_col", 50.0), ("alpha_col", 50.0)]);
        let ranked = rank_insights(
            vec![validated("zebra_col", 1), validated("alpha_col", 2)],
            &idx,
        );
        assert_eq!(ranked[0].factor, "alpha_col");
        assert_eq!(ranked[1].factor, "zebra_col");
    }

    #[test]
    fn missing_impact_defaults_to_zero() {
        let idx = index(&[("strong_col", 10.0)]);
        // "orphan_col" has no ranked record, so it sorts behind strong_col.
        let ranked = rank_insights(
            vec![validated("orphan_col", 1), validated("strong_col", 2)],
            &idx,
        );
        assert_eq!(ranked[0].factor, "strong_col");
    }

    #[test]
    fn ranks_are_contiguous_from_one() {
        let idx = index(&[("a", 3.0), ("b", 2.0), ("c", 1.0)]);
        let ranked = rank_insights(
            vec![validated("c", 7), validated("a", 7), validated("b", 7)],
            &idx,
        );
        let ranks: Vec<u32> = ranked.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
