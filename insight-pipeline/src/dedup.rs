//! Final-list shaping: factor dedup and the empty-result fallback.

use std::collections::HashSet;

use tracing::debug;

use crate::confidence::confidence_explanation;
use crate::insight::SanitizedInsight;
use crate::stats::Confidence;

/// Factor name of the canned no-findings insight.
pub const FALLBACK_FACTOR: &str = "analysis_complete";

const FALLBACK_WHY: &str = "Analysis completed. No strong statistically significant relationships \
were detected between the available factors and the decision metric.";

const FALLBACK_EVIDENCE: &str = "Statistical threshold not met";

/// Drops repeated factors (first occurrence wins, order = post-ranking
/// order), renumbers ranks, and guarantees a non-empty list by injecting
/// exactly one canned insight when everything was filtered away.
pub fn finalize(insights: Vec<SanitizedInsight>, total_rows: u64) -> Vec<SanitizedInsight> {
    let before = insights.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<SanitizedInsight> = insights
        .into_iter()
        .filter(|i| seen.insert(i.factor.clone()))
        .collect();

    if out.len() != before {
        debug!(dropped = before - out.len(), "duplicate factors removed");
    }

    for (i, insight) in out.iter_mut().enumerate() {
        insight.rank = (i + 1) as u32;
    }

    if out.is_empty() {
        debug!("no insights survived sanitation; injecting canned fallback");
        out.push(fallback_insight(total_rows));
    }
    out
}

/// The single canned insight used when a successful validation run ends up
/// with nothing presentable. Keeps the HTTP response from being an empty
/// success payload.
pub fn fallback_insight(total_rows: u64) -> SanitizedInsight {
    SanitizedInsight {
        rank: 1,
        factor: FALLBACK_FACTOR.to_string(),
        why_it_matters: FALLBACK_WHY.to_string(),
        evidence: FALLBACK_EVIDENCE.to_string(),
        confidence: Confidence::Low,
        confidence_explanation: confidence_explanation(Confidence::Low, total_rows, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitized(factor: &str, rank: u32) -> SanitizedInsight {
        SanitizedInsight {
            rank,
            factor: factor.into(),
            why_it_matters: format!("{factor} pattern"),
            evidence: "stat".into(),
            confidence: Confidence::Medium,
            confidence_explanation: "Medium confidence based on 500 rows.".into(),
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let out = finalize(
            vec![
                sanitized("marketing_spend", 1),
                sanitized("region", 2),
                sanitized("marketing_spend", 3),
            ],
            500,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].factor, "marketing_spend");
        assert_eq!(out[0].why_it_matters, "marketing_spend pattern");
        assert_eq!(out[1].factor, "region");
    }

    #[test]
    fn ranks_are_renumbered_after_dedup() {
        let out = finalize(
            vec![
                sanitized("a", 1),
                sanitized("a", 2),
                sanitized("b", 3),
            ],
            500,
        );
        let ranks: Vec<u32> = out.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[test]
    fn empty_list_gets_exactly_one_canned_insight() {
        let out = finalize(vec![], 500);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].factor, FALLBACK_FACTOR);
        assert_eq!(out[0].rank, 1);
        assert_eq!(out[0].confidence, Confidence::Low);
        assert_eq!(out[0].evidence, "Statistical threshold not met");
    }

    #[test]
    fn non_empty_input_stays_non_empty() {
        let out = finalize(vec![sanitized("a", 1)], 500);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].factor, "a");
    }
}
