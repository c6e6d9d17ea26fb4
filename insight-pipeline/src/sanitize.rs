//! Language sanitization for model-written insight text.
//!
//! Pass order for `why_it_matters` (fixed; later patterns rely on earlier
//! ones having fired):
//! 1) correlation magnitudes become qualitative bands;
//! 2) mean-difference mentions become "substantial mean difference";
//! 3) residual percentages and standalone numbers are stripped;
//! 4) the causal-phrase rewrite table runs in order;
//! 5) whitespace/punctuation normalization;
//! 6) residual forbidden token or too-short text → fixed neutral fallback.
//!
//! `evidence` keeps its raw numbers (they are allowed there) but still goes
//! through string coercion and the causal-phrase treatment.
//!
//! All tables are process-wide constants; nothing is compiled per request.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::confidence::{cap_confidence, compute_confidence, confidence_explanation};
use crate::index::FactorStatsIndex;
use crate::insight::{SanitizedInsight, ValidatedInsight};

/// Fixed neutral sentence used when `why_it_matters` cannot be cleaned.
pub const NEUTRAL_WHY_FALLBACK: &str =
    "This factor shows a pattern associated with the decision metric.";

/// Fixed sentence used when `evidence` cannot be cleaned.
pub const EVIDENCE_FALLBACK: &str = "Derived from the computed dataset statistics.";

/// Sanitized text shorter than this is considered unusable.
const MIN_WHY_LEN: usize = 10;

/// Detector for causal phrasing, inflections included. Anything this
/// matches after the rewrite pass forces the fallback sentence.
static FORBIDDEN_DETECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:caus(?:e|es|ed|ing)|driv(?:e|es|en|ing)|drove|lead(?:s)?\s+to|leading\s+to|led\s+to|result(?:s|ed|ing)?\s+in|improv(?:e|es|ed|ing)|worsen(?:s|ed|ing)?)\b",
    )
    .expect("forbidden-phrase detector must compile")
});

/// Ordered causal-phrase rewrite table. Order is load-bearing; later
/// entries assume the earlier ones have already fired.
static CAUSAL_REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    let table: &[(&str, &str)] = &[
        (r"(?i)\bcauses?\b", "is associated with"),
        (r"(?i)\bdrives?\b", "appears to influence"),
        (r"(?i)\bdriving\b", "influencing"),
        (r"(?i)\bleads?\s+to\b", "is associated with"),
        (r"(?i)\bresults?\s+in\b", "is associated with"),
        (r"(?i)\bimproves?\b", "is associated with higher values"),
        (r"(?i)\bworsens?\b", "is associated with lower values"),
        (
            r"(?i)\bsignificant\s+(?:impact|influence|effect)\b",
            "strong association",
        ),
    ];
    table
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("causal rewrite pattern must compile"),
                *replacement,
            )
        })
        .collect()
});

/// "correlation of 0.75" / "correlation: .4" style mentions.
static CORRELATION_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcorrelation\s*(?:coefficient\s*)?(?:of|is|was|at|[:=])?\s*(-?(?:\d+\.\d+|\.\d+|\d+))")
        .expect("correlation pattern must compile")
});

/// "0.75 correlation" style mentions (magnitude first).
static CORRELATION_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-?(?:\d+\.\d+|\.\d+|\d+))\s+correlation\b")
        .expect("correlation pattern must compile")
});

/// "mean difference of 0.34" style mentions.
static MEAN_DIFF_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmean\s+difference\s*(?:of|is|was|[:=])?\s*(-?(?:\d+\.\d+|\.\d+|\d+))")
        .expect("mean-difference pattern must compile")
});

/// "0.34 mean difference" style mentions.
static MEAN_DIFF_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-?(?:\d+\.\d+|\.\d+|\d+))\s+mean\s+difference\b")
        .expect("mean-difference pattern must compile")
});

static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?(?:\d+\.\d+|\.\d+|\d+)\s*(?:%|percent\b)").expect("percentage pattern must compile")
});

static STANDALONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d+(?:\.\d+)?\b").expect("number pattern must compile")
});

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern must compile"));

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?)])").expect("punctuation pattern must compile"));

/// Qualitative band for a correlation magnitude.
fn correlation_band(magnitude: f64) -> &'static str {
    let m = magnitude.abs();
    if m > 0.7 {
        "strong correlation"
    } else if m > 0.4 {
        "moderate correlation"
    } else {
        "weak correlation"
    }
}

fn replace_correlation_mentions(text: &str) -> String {
    let banded = CORRELATION_AFTER.replace_all(text, |caps: &regex::Captures<'_>| {
        let magnitude: f64 = caps[1].parse().unwrap_or(0.0);
        correlation_band(magnitude).to_string()
    });
    CORRELATION_BEFORE
        .replace_all(&banded, |caps: &regex::Captures<'_>| {
            let magnitude: f64 = caps[1].parse().unwrap_or(0.0);
            correlation_band(magnitude).to_string()
        })
        .into_owned()
}

fn replace_mean_difference_mentions(text: &str) -> String {
    let first = MEAN_DIFF_AFTER.replace_all(text, "substantial mean difference");
    MEAN_DIFF_BEFORE
        .replace_all(&first, "substantial mean difference")
        .into_owned()
}

fn strip_residual_numbers(text: &str) -> String {
    let no_pct = PERCENTAGE.replace_all(text, "");
    STANDALONE_NUMBER.replace_all(&no_pct, "").into_owned()
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = MULTI_SPACE.replace_all(text, " ");
    SPACE_BEFORE_PUNCT
        .replace_all(&collapsed, "$1")
        .trim()
        .to_string()
}

/// Applies the ordered causal-phrase rewrite table.
pub fn rewrite_causal_phrases(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in CAUSAL_REWRITES.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// True when the text still carries a forbidden causal token.
pub fn contains_forbidden_phrase(text: &str) -> bool {
    FORBIDDEN_DETECTOR.is_match(text)
}

/// Coerces an untrusted JSON value into a scalar string: objects/arrays
/// become their JSON text, absent/null values become `fallback`.
pub fn ensure_string(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Full treatment for `why_it_matters` text.
pub fn sanitize_why(text: &str) -> String {
    let banded = replace_correlation_mentions(text);
    let banded = replace_mean_difference_mentions(&banded);
    let stripped = strip_residual_numbers(&banded);
    let rewritten = rewrite_causal_phrases(&stripped);
    let cleaned = normalize_whitespace(&rewritten);

    if contains_forbidden_phrase(&cleaned) || cleaned.chars().count() < MIN_WHY_LEN {
        return NEUTRAL_WHY_FALLBACK.to_string();
    }
    cleaned
}

/// Treatment for `evidence` text: raw numbers allowed, causal phrasing not.
pub fn sanitize_evidence(text: &str) -> String {
    let rewritten = rewrite_causal_phrases(text);
    let cleaned = rewritten.trim().to_string();
    if cleaned.is_empty() || contains_forbidden_phrase(&cleaned) {
        return EVIDENCE_FALLBACK.to_string();
    }
    cleaned
}

/// Treatment for loose model text (data risks, limitations). Returns `None`
/// when the text is empty or cannot be neutralized.
pub fn sanitize_free_text(text: &str) -> Option<String> {
    let rewritten = rewrite_causal_phrases(text);
    let cleaned = rewritten.trim().to_string();
    if cleaned.is_empty() || contains_forbidden_phrase(&cleaned) {
        return None;
    }
    Some(cleaned)
}

/// Sanitizes one validated insight and applies the dataset-size ceiling.
///
/// Re-checks factor approval and recomputes confidence from the backend
/// record, silently overwriting whatever the validated value was. Returns
/// `None` only when the factor is no longer approved.
pub fn sanitize_and_cap(
    insight: &ValidatedInsight,
    index: &FactorStatsIndex,
    total_rows: u64,
) -> Option<SanitizedInsight> {
    if !index.is_approved(&insight.factor) {
        warn!(
            factor = %insight.factor,
            "factor lost approval between validation and sanitation; dropping"
        );
        return None;
    }

    let stat = index.stat(&insight.factor);
    let backend_confidence = stat.map(compute_confidence).unwrap_or(insight.confidence);
    let capped = cap_confidence(backend_confidence, total_rows);

    Some(SanitizedInsight {
        rank: insight.rank,
        factor: insight.factor.clone(),
        why_it_matters: sanitize_why(&insight.why_it_matters),
        evidence: sanitize_evidence(&insight.evidence),
        confidence: capped,
        confidence_explanation: confidence_explanation(capped, total_rows, stat),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BackendStats, Confidence, FactorKind, FactorStat};
    use serde_json::json;

    fn output_is_clean(text: &str) {
        let property = Regex::new(
            r"(?i)\b(causes?|drives?|leads?\s+to|results?\s+in|improves?|worsens?)\b",
        )
        .unwrap();
        assert!(!property.is_match(text), "forbidden phrasing in: {text}");
    }

    #[test]
    fn causal_verb_is_rewritten_in_place() {
        let out = sanitize_why("Marketing spend causes revenue to increase");
        assert_eq!(out, "Marketing spend is associated with revenue to increase");
        output_is_clean(&out);
    }

    #[test]
    fn correlation_magnitudes_become_bands() {
        assert_eq!(
            sanitize_why("Shows a 0.75 correlation with revenue"),
            "Shows a strong correlation with revenue"
        );
        assert_eq!(
            sanitize_why("The correlation of 0.45 suggests a link"),
            "The moderate correlation suggests a link"
        );
        assert_eq!(
            sanitize_why("Only a correlation of 0.2 with the outcome"),
            "Only a weak correlation with the outcome"
        );
    }

    #[test]
    fn mean_difference_mentions_become_qualitative() {
        let out = sanitize_why("A mean difference of 0.34 separates the segments");
        assert_eq!(out, "A substantial mean difference separates the segments");
    }

    #[test]
    fn percentages_and_numbers_are_stripped_from_why() {
        let out = sanitize_why("Top segment exceeds the base by 23% across 4 regions");
        assert!(!out.contains('2'));
        assert!(!out.contains('4'));
        assert!(!out.contains('%'));
        output_is_clean(&out);
    }

    #[test]
    fn residual_inflection_forces_fallback() {
        // "causing" is not in the rewrite table; the detector catches it.
        let out = sanitize_why("Seems to be causing the metric to rise");
        assert_eq!(out, NEUTRAL_WHY_FALLBACK);
    }

    #[test]
    fn too_short_text_forces_fallback() {
        assert_eq!(sanitize_why("ok"), NEUTRAL_WHY_FALLBACK);
        assert_eq!(sanitize_why(""), NEUTRAL_WHY_FALLBACK);
    }

    #[test]
    fn evidence_keeps_numbers_but_not_causal_verbs() {
        let out = sanitize_evidence("correlation 0.75; drives revenue upward");
        assert!(out.contains("0.75"));
        assert!(out.contains("appears to influence"));
        output_is_clean(&out);
    }

    #[test]
    fn uncleanable_evidence_falls_back() {
        assert_eq!(sanitize_evidence("   "), EVIDENCE_FALLBACK);
        assert_eq!(sanitize_evidence("causing a shift"), EVIDENCE_FALLBACK);
    }

    #[test]
    fn ensure_string_coerces_non_scalars() {
        assert_eq!(
            ensure_string(Some(&json!({ "text": "nested" })), "fb"),
            r#"{"text":"nested"}"#
        );
        assert_eq!(ensure_string(Some(&json!(null)), "fb"), "fb");
        assert_eq!(ensure_string(None, "fb"), "fb");
        assert_eq!(ensure_string(Some(&json!("plain")), "fb"), "plain");
    }

    #[test]
    fn significant_impact_becomes_strong_association() {
        let out = sanitize_why("There is a significant impact on churn here");
        assert_eq!(out, "There is a strong association on churn here");
    }

    #[test]
    fn free_text_that_cannot_be_neutralized_is_dropped() {
        assert_eq!(sanitize_free_text("worsening data quality"), None);
        assert_eq!(
            sanitize_free_text("High missing-value share in the metric column"),
            Some("High missing-value share in the metric column".to_string())
        );
    }

    #[test]
    fn sanitize_and_cap_recomputes_and_caps_confidence() {
        let backend = BackendStats {
            decision_metric: "revenue".into(),
            total_rows: 80,
            valid_rows: 80,
            missing_percentage: 0.0,
            top_factors: vec![FactorStat {
                impact_score: Some(85.5),
                abs_correlation: Some(0.75),
                ..FactorStat::bare("marketing_spend", FactorKind::Numeric)
            }],
            all_correlations: vec![],
            all_segment_impacts: vec![],
            excluded_columns: vec![],
        };
        let index = FactorStatsIndex::build(&backend, None);
        let validated = ValidatedInsight {
            rank: 1,
            factor: "marketing_spend".into(),
            why_it_matters: "Marketing spend causes revenue to increase".into(),
            evidence: "correlation 0.75".into(),
            // Deliberately wrong; must be recomputed then capped.
            confidence: Confidence::Low,
        };

        let sanitized = sanitize_and_cap(&validated, &index, 80).unwrap();
        // 0.75 computes High, but 80 rows cap at Medium.
        assert_eq!(sanitized.confidence, Confidence::Medium);
        assert_eq!(
            sanitized.why_it_matters,
            "Marketing spend is associated with revenue to increase"
        );
        assert!(sanitized.confidence_explanation.contains("80 rows"));
    }

    #[test]
    fn unapproved_factor_is_dropped_in_depth() {
        let empty = BackendStats {
            decision_metric: "revenue".into(),
            total_rows: 1000,
            valid_rows: 1000,
            missing_percentage: 0.0,
            top_factors: vec![],
            all_correlations: vec![],
            all_segment_impacts: vec![],
            excluded_columns: vec![],
        };
        let index = FactorStatsIndex::build(&empty, None);
        let validated = ValidatedInsight {
            rank: 1,
            factor: "ghost_col".into(),
            why_it_matters: "text".into(),
            evidence: "text".into(),
            confidence: Confidence::High,
        };
        assert!(sanitize_and_cap(&validated, &index, 1000).is_none());
    }
}
