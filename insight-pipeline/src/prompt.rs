//! Prompt builders for the insight-generation call.
//!
//! Keep prompts compact; list only the statistics the gates will later
//! check, so the model has no incentive to invent factors.

use ai_llm_service::ChatMessage;

use crate::stats::{BackendStats, FactorKind};

/// System + user messages for one generation call.
pub fn build_messages(stats: &BackendStats, prior_sentences: &[String]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(stats, prior_sentences)),
    ]
}

fn system_prompt() -> String {
    let mut s = String::new();
    s.push_str("You are a data analyst writing decision insights for a business user.\n");
    s.push_str("Respond with a single JSON object and nothing else, with keys:\n");
    s.push_str(
        "decisionMetric (string), topInsights (array of {rank, factor, whyItMatters, evidence, confidence}), dataRisks (array of strings), limitations (string).\n",
    );
    s.push_str("Use only factor names listed in the statistics below.\n");
    s.push_str(
        "Describe associations and patterns in the data; never claim that a factor changes the metric.\n",
    );
    s
}

fn user_prompt(stats: &BackendStats, prior_sentences: &[String]) -> String {
    let mut s = String::new();
    s.push_str("# Decision metric\n");
    s.push_str(&stats.decision_metric);
    s.push('\n');

    s.push_str("\n# Dataset\n");
    s.push_str(&format!(
        "rows={} valid_rows={} missing_pct={:.2}\n",
        stats.total_rows, stats.valid_rows, stats.missing_percentage
    ));

    s.push_str("\n# Ranked factors\n");
    for factor in &stats.top_factors {
        match factor.kind {
            FactorKind::Numeric => {
                s.push_str(&format!(
                    "- {} (numeric): impact {:.2}, correlation {:.4}\n",
                    factor.factor,
                    factor.impact_score.unwrap_or(0.0),
                    factor.correlation.or(factor.abs_correlation).unwrap_or(0.0),
                ));
            }
            FactorKind::Categorical => {
                let segments = factor
                    .top_segments
                    .as_ref()
                    .map(|m| m.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                s.push_str(&format!(
                    "- {} (categorical): impact {:.2}, mean difference {:.4}, segments: {}\n",
                    factor.factor,
                    factor.impact_score.unwrap_or(0.0),
                    factor.mean_difference.unwrap_or(0.0),
                    segments,
                ));
            }
        }
    }

    if !stats.excluded_columns.is_empty() {
        s.push_str("\n# Columns excluded from analysis (do not mention as factors)\n");
        for excluded in &stats.excluded_columns {
            s.push_str(&format!("- {} ({})\n", excluded.column, excluded.reason));
        }
    }

    if !prior_sentences.is_empty() {
        s.push_str("\n# Earlier insights for this dataset (write different wording)\n");
        for sentence in prior_sentences {
            s.push_str(&format!("- {sentence}\n"));
        }
    }

    s.push_str("\n# Instructions\n");
    s.push_str("- One insight per factor, strongest first.\n");
    s.push_str("- whyItMatters: one plain-language sentence about the association.\n");
    s.push_str("- evidence: cite the statistic that supports it.\n");
    s
}
