//! Script bridge handler for the mobile client.
//!
//! Runs a named script under the plain calling convention: optional
//! `args` text is written to stdin verbatim and the trimmed stdout is
//! returned as-is.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use sportif_core::scripting::invocation::{InvocationRequest, ScriptOutput};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /scripts/run`.
#[derive(Debug, Deserialize)]
pub struct RunScriptRequest {
    /// File name of the script inside the scripts root (required).
    pub script_name: Option<String>,
    /// Raw text piped to the script's stdin.
    pub args: Option<String>,
}

/// POST /scripts/run
///
/// Run a script and return its captured output.
pub async fn run_script(
    State(state): State<AppState>,
    Json(input): Json<RunScriptRequest>,
) -> AppResult<Json<DataResponse<ScriptOutput>>> {
    let script_name = input
        .script_name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Script name is required".to_string()))?;

    let mut request = InvocationRequest::new(script_name)?;
    if let Some(args) = input.args {
        request = request.with_payload(args);
    }

    let output = state.orchestrator.run(request).await?;
    Ok(Json(DataResponse { data: output }))
}
