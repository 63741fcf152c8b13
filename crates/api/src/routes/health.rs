use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the analysis interpreter answers a version probe.
    pub interpreter_available: bool,
}

/// GET /health -- returns service and interpreter health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let interpreter_available = state.orchestrator.interpreter_available().await;

    let status = if interpreter_available { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        interpreter_available,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
