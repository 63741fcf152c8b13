//! Drill analysis handler.
//!
//! Runs the drill analyzer under the JSON calling convention: the request
//! is written to the script's stdin as JSON and the script's stdout is
//! returned as the analysis result.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sportif_core::scripting::invocation::{CallingConvention, InvocationRequest};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Script name of the drill analyzer, relative to the scripts root.
pub const DRILL_ANALYZER_SCRIPT: &str = "drill_analyzer.py";

/// Request body for `POST /analyze-drill`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeDrillRequest {
    /// Name of the drill to analyze (required).
    pub drill: Option<String>,
    /// Path to the recorded video, if any.
    pub video_path: Option<String>,
}

/// POST /analyze-drill
///
/// Run the drill analyzer and return its decoded JSON result.
pub async fn analyze_drill(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeDrillRequest>,
) -> AppResult<Json<DataResponse<Value>>> {
    let drill = input
        .drill
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Drill name is required".to_string()))?;

    let request = InvocationRequest::new(DRILL_ANALYZER_SCRIPT)?
        .with_convention(CallingConvention::Json)
        .with_payload(json!({
            "drill": drill,
            "video_path": input.video_path,
        }));

    let output = state.orchestrator.run(request).await?;
    let result: Value = output.decode()?;

    tracing::info!(%drill, duration_ms = output.duration_ms, "Drill analysis completed");

    Ok(Json(DataResponse { data: result }))
}
