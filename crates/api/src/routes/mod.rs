pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /analyze-drill      run the drill analyzer, JSON in / JSON out (POST)
/// /scripts/run        run a named script, text in / text out (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-drill", post(handlers::analysis::analyze_drill))
        .route("/scripts/run", post(handlers::scripts::run_script))
}
