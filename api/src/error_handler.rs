use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use insight_pipeline::InsightError;
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // startup-only
            AppError::MissingEnv(_) | AppError::HttpClient(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // custom mapped
            AppError::Http { status, .. } => *status,

            // 5xx
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::HttpClient(_) => "HTTP_CLIENT_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpClient(err)
    }
}

/// Maps an `InsightError` to HTTP status, stable code, and client message.
///
/// The statistics backend's own status propagates unchanged; everything
/// else maps per the pipeline error taxonomy. Messages only — stack traces
/// never leave the process.
pub fn insight_error_parts(err: &InsightError) -> (StatusCode, &'static str, String) {
    match err {
        InsightError::UpstreamCompute { status, message } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            "UPSTREAM_COMPUTE_FAILED",
            message.clone(),
        ),
        InsightError::Model(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "MODEL_CALL_FAILED",
            format!("Language model call failed: {e}"),
        ),
        InsightError::MalformedModelOutput { excerpt } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "MALFORMED_MODEL_OUTPUT",
            format!(
                "The language model returned output that could not be interpreted as insights. Raw excerpt: {excerpt}"
            ),
        ),
        InsightError::NoValidInsights(message) => (
            StatusCode::BAD_REQUEST,
            "NO_VALID_INSIGHTS",
            message.clone(),
        ),
        InsightError::Snapshot(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "SNAPSHOT_ERROR",
            format!("Insight snapshot access failed: {e}"),
        ),
    }
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        let (status, code, message) = insight_error_parts(&err);
        AppError::Http {
            status,
            code,
            message,
        }
    }
}
