use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, info, instrument, warn};

use ai_llm_service::{GroqService, config::default_config::config_groq};
use insight_pipeline::{InsightPipeline, InsightRequest};

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ApiErrorDetail, ApiResponse},
    },
    error_handler::insight_error_parts,
    routes::insights::{
        insights_request::GenerateInsightsRequest, insights_response::GenerateInsightsResponse,
    },
};

/// HTTP endpoint for generating decision insights.
///
/// Expects a JSON payload with `workspaceId`, `datasetId`, `decisionMetric`,
/// `provider` ("groq"), `model`, and optional `apiKey`/`regenerate`. Runs
/// the validation/sanitization pipeline against the analysis backend's
/// statistics and the configured model, and returns the enveloped result.
#[instrument(
    name = "generate_insights_route",
    skip(state, headers, body),
    fields(workspace = %body.workspace_id, dataset = %body.dataset_id)
)]
pub async fn generate_insights_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<GenerateInsightsRequest>,
) -> Response {
    if let Some(id) = headers.get("X-Request-Id").and_then(|h| h.to_str().ok()) {
        debug!(%id, "request id attached");
    }

    // --- Validate request fields ------------------------------------------
    let details = body.validate();
    if !details.is_empty() {
        return ApiResponse::<()>::error("BAD_REQUEST", "Invalid insight request.", details)
            .into_response_with_status(StatusCode::BAD_REQUEST);
    }

    // --- Build the per-request model client -------------------------------
    // The request's key wins over the server-side one.
    let api_key = body.api_key.clone().or_else(|| state.groq_api_key.clone());
    let cfg = match config_groq(&body.model, api_key) {
        Ok(cfg) => cfg,
        Err(err) => {
            let details = vec![ApiErrorDetail {
                path: Some("apiKey".into()),
                hint: Some("Provide apiKey in the request or configure GROQ_API_KEY.".into()),
            }];
            return ApiResponse::<()>::error("BAD_REQUEST", err.to_string(), details)
                .into_response_with_status(StatusCode::BAD_REQUEST);
        }
    };
    let model_client = match GroqService::new(cfg) {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "model client construction failed");
            return ApiResponse::<()>::error("MODEL_CLIENT_ERROR", err.to_string(), Vec::new())
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    info!(
        metric = %body.decision_metric,
        model = %body.model,
        regenerate = body.regenerate,
        "starting insight generation"
    );

    // --- Run pipeline ------------------------------------------------------
    let pipeline = InsightPipeline::new(&state.stats, &state.schema, &model_client, &state.store)
        .with_policy(state.policy);

    let request = InsightRequest {
        workspace_id: body.workspace_id.clone(),
        dataset_id: body.dataset_id.clone(),
        decision_metric: body.decision_metric.clone(),
        model: body.model.clone(),
        regenerate: body.regenerate,
    };

    match pipeline.run(&request).await {
        Ok(outcome) => ApiResponse::success(GenerateInsightsResponse::from(outcome))
            .into_response_with_status(StatusCode::OK),
        Err(err) => {
            let (status, code, message) = insight_error_parts(&err);
            warn!(%status, code, "insight generation failed");
            ApiResponse::<()>::error(code, message, Vec::new())
                .into_response_with_status(status)
        }
    }
}
