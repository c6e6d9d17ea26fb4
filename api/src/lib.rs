use std::sync::Arc;

pub mod collaborators;
pub mod core;
pub mod error_handler;
mod routes;

use axum::{Router, routing::post};
use tokio::signal;
use tracing::info;

use crate::core::app_state::AppState;
use crate::error_handler::{AppError, AppResult};
use crate::routes::insights::generate_insights_route::generate_insights_route;

/// Boots the HTTP server.
///
/// Binds to `API_ADDRESS`, exposes `POST /insights`, and shuts down
/// gracefully on Ctrl+C.
pub async fn start() -> AppResult<()> {
    let state = Arc::new(AppState::from_env()?);

    let app = Router::new()
        .route("/insights", post(generate_insights_route))
        .with_state(state);

    let host_url =
        std::env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "insights API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
