//! Parsing of the untrusted model response into [`RawInsightDoc`].
//!
//! Models wrap JSON in prose or code fences often enough that three
//! extraction attempts are worth it: the whole body, the outermost brace
//! window, then a ```json fence. Anything still unparseable — or a payload
//! missing `decisionMetric`/`topInsights` — is a malformed-output error
//! carrying a truncated excerpt of the raw response for diagnosis.

use serde_json::Value;
use tracing::debug;

use crate::errors::InsightError;
use crate::insight::{RawInsight, RawInsightDoc};

/// Maximum excerpt length carried inside a malformed-output error.
pub const RAW_EXCERPT_LEN: usize = 200;

/// Parsed, still-untrusted model document with the required fields present.
#[derive(Debug, Clone)]
pub struct ParsedModelDoc {
    pub decision_metric: String,
    pub insights: Vec<RawInsight>,
    pub data_risks: Vec<Value>,
    pub limitations: Option<Value>,
}

/// Parses a raw model response.
///
/// # Errors
/// [`InsightError::MalformedModelOutput`] when no JSON object can be
/// extracted or the document lacks `decisionMetric`/`topInsights`.
pub fn parse_model_output(raw: &str) -> Result<ParsedModelDoc, InsightError> {
    let json_text = extract_json(raw).ok_or_else(|| malformed(raw))?;

    let doc: RawInsightDoc = serde_json::from_str(&json_text).map_err(|e| {
        debug!(error = %e, "model JSON did not match the insight document shape");
        malformed(raw)
    })?;

    let decision_metric = doc
        .decision_metric
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| malformed(raw))?;
    let insights = doc.top_insights.ok_or_else(|| malformed(raw))?;

    Ok(ParsedModelDoc {
        decision_metric,
        insights,
        data_risks: doc.data_risks.unwrap_or_default(),
        limitations: doc.limitations,
    })
}

fn malformed(raw: &str) -> InsightError {
    let collapsed: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    InsightError::MalformedModelOutput {
        excerpt: collapsed.chars().take(RAW_EXCERPT_LEN).collect(),
    }
}

/// Extracts a JSON object from a response that might contain extra text.
fn extract_json(response: &str) -> Option<String> {
    // First try: the whole response is JSON.
    if serde_json::from_str::<Value>(response).is_ok() {
        return Some(response.to_string());
    }

    // Second try: the outermost brace window.
    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            let candidate = &response[start..=end];
            if serde_json::from_str::<Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    // Third try: a fenced ```json block.
    if let Some(start) = response.find("```json") {
        let body = &response[start + 7..];
        if let Some(end) = body.find("```") {
            return extract_json(body[..end].trim());
        }
    }

    None
}
