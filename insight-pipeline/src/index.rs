//! Approved-factor set and per-factor statistics lookup.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::stats::{BackendStats, FactorKind, FactorStat};

/// Lookup structure built once per run from [`BackendStats`] and an optional
/// authoritative schema column list.
///
/// The approved set is the schema column list when one is available and
/// non-empty; otherwise the union of factor names across the three stat
/// lists. The per-factor record prefers the ranked (`top_factors`) entry,
/// falling back to a correlation record tagged numeric or a segment-impact
/// record tagged categorical.
#[derive(Debug, Clone, Default)]
pub struct FactorStatsIndex {
    approved: BTreeSet<String>,
    stats: BTreeMap<String, FactorStat>,
}

impl FactorStatsIndex {
    pub fn build(backend: &BackendStats, schema_columns: Option<&[String]>) -> Self {
        let mut stats: BTreeMap<String, FactorStat> = BTreeMap::new();

        // Least authoritative first; later inserts overwrite.
        for seg in &backend.all_segment_impacts {
            let mut record = seg.clone();
            record.kind = FactorKind::Categorical;
            stats.insert(record.factor.clone(), record);
        }
        for corr in &backend.all_correlations {
            let mut record = corr.clone();
            record.kind = FactorKind::Numeric;
            stats.insert(record.factor.clone(), record);
        }
        for top in &backend.top_factors {
            stats.insert(top.factor.clone(), top.clone());
        }

        let approved: BTreeSet<String> = match schema_columns {
            Some(columns) if !columns.is_empty() => {
                columns.iter().map(|c| c.trim().to_string()).collect()
            }
            _ => stats.keys().cloned().collect(),
        };

        debug!(
            approved = approved.len(),
            records = stats.len(),
            schema_backed = schema_columns.is_some_and(|c| !c.is_empty()),
            "factor index built"
        );

        Self { approved, stats }
    }

    pub fn is_approved(&self, factor: &str) -> bool {
        self.approved.contains(factor)
    }

    pub fn stat(&self, factor: &str) -> Option<&FactorStat> {
        self.stats.get(factor)
    }

    pub fn approved_len(&self) -> usize {
        self.approved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FactorKind;

    fn backend() -> BackendStats {
        BackendStats {
            decision_metric: "revenue".into(),
            total_rows: 1000,
            valid_rows: 990,
            missing_percentage: 1.0,
            top_factors: vec![FactorStat {
                impact_score: Some(85.5),
                abs_correlation: Some(0.75),
                ..FactorStat::bare("marketing_spend", FactorKind::Numeric)
            }],
            all_correlations: vec![
                FactorStat {
                    abs_correlation: Some(0.75),
                    ..FactorStat::bare("marketing_spend", FactorKind::Numeric)
                },
                FactorStat {
                    abs_correlation: Some(0.2),
                    ..FactorStat::bare("price", FactorKind::Numeric)
                },
            ],
            all_segment_impacts: vec![FactorStat {
                mean_difference: Some(0.3),
                relative_impact_pct: Some(15.0),
                ..FactorStat::bare("region", FactorKind::Categorical)
            }],
            excluded_columns: vec![],
        }
    }

    #[test]
    fn union_allow_list_without_schema() {
        let idx = FactorStatsIndex::build(&backend(), None);
        assert!(idx.is_approved("marketing_spend"));
        assert!(idx.is_approved("price"));
        assert!(idx.is_approved("region"));
        assert!(!idx.is_approved("unknown_feature"));
        assert_eq!(idx.approved_len(), 3);
    }

    #[test]
    fn schema_columns_take_precedence() {
        let columns = vec!["marketing_spend".to_string(), "discount".to_string()];
        let idx = FactorStatsIndex::build(&backend(), Some(&columns));
        assert!(idx.is_approved("discount"));
        // Present in the stats but absent from the schema list.
        assert!(!idx.is_approved("region"));
    }

    #[test]
    fn empty_schema_falls_back_to_stats_union() {
        let idx = FactorStatsIndex::build(&backend(), Some(&[]));
        assert!(idx.is_approved("region"));
    }

    #[test]
    fn ranked_record_preferred_over_correlation_record() {
        let idx = FactorStatsIndex::build(&backend(), None);
        let stat = idx.stat("marketing_spend").unwrap();
        assert_eq!(stat.impact_score, Some(85.5));
    }

    #[test]
    fn fallback_records_carry_inferred_kind() {
        let idx = FactorStatsIndex::build(&backend(), None);
        assert_eq!(idx.stat("price").unwrap().kind, FactorKind::Numeric);
        assert_eq!(idx.stat("region").unwrap().kind, FactorKind::Categorical);
    }

    #[test]
    fn empty_input_yields_empty_index() {
        let empty = BackendStats {
            decision_metric: "revenue".into(),
            total_rows: 0,
            valid_rows: 0,
            missing_percentage: 0.0,
            top_factors: vec![],
            all_correlations: vec![],
            all_segment_impacts: vec![],
            excluded_columns: vec![],
        };
        let idx = FactorStatsIndex::build(&empty, None);
        assert_eq!(idx.approved_len(), 0);
        assert!(idx.stat("anything").is_none());
    }
}
