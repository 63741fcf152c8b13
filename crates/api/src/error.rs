use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sportif_core::error::ScriptError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ScriptError`] for orchestrator failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from the script orchestrator.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Script(err) => classify_script_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}

type Classified = (StatusCode, &'static str, String, Option<String>);

fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

/// Classify an orchestrator failure into status, error code, message and
/// optional script diagnostics.
///
/// Filesystem paths and OS errors are logged, never returned.
fn classify_script_error(err: &ScriptError) -> Classified {
    match err {
        ScriptError::InterpreterUnavailable { interpreter } => {
            tracing::error!(%interpreter, "Analysis interpreter unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "INTERPRETER_UNAVAILABLE",
                "Analysis runtime is not available".to_string(),
                None,
            )
        }
        ScriptError::InvalidIdentifier(name) => (
            StatusCode::BAD_REQUEST,
            "INVALID_SCRIPT_NAME",
            format!("Invalid script name: {name:?}"),
            None,
        ),
        ScriptError::NotFound(path) => {
            tracing::error!(path = %path.display(), "Analysis script not found");
            (
                StatusCode::NOT_FOUND,
                "SCRIPT_NOT_FOUND",
                "Analysis script not found".to_string(),
                None,
            )
        }
        ScriptError::NonZeroExit { exit_code, .. } => {
            tracing::error!(exit_code, "Analysis script failed");
            (
                StatusCode::BAD_GATEWAY,
                "ANALYSIS_FAILED",
                format!("Analysis failed with exit code {exit_code}"),
                err.diagnostics(),
            )
        }
        ScriptError::MalformedOutput { source, .. } => {
            tracing::error!(error = %source, "Analysis script produced malformed output");
            (
                StatusCode::BAD_GATEWAY,
                "MALFORMED_OUTPUT",
                "Error parsing analysis result".to_string(),
                Some(source.to_string()),
            )
        }
        ScriptError::OutputTooLarge { limit_bytes } => {
            tracing::error!(limit_bytes, "Analysis output exceeded capture limit");
            (
                StatusCode::BAD_GATEWAY,
                "OUTPUT_TOO_LARGE",
                "Analysis result exceeded the size limit".to_string(),
                None,
            )
        }
        ScriptError::TimedOut { elapsed_ms } => (
            StatusCode::GATEWAY_TIMEOUT,
            "ANALYSIS_TIMEOUT",
            format!("Analysis timed out after {elapsed_ms}ms"),
            None,
        ),
        ScriptError::Cancelled { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "ANALYSIS_CANCELLED",
            "Analysis was cancelled".to_string(),
            None,
        ),
        ScriptError::InvalidPayload(_)
        | ScriptError::LaunchFailed { .. }
        | ScriptError::Io(_)
        | ScriptError::WorkerLost(_) => {
            tracing::error!(error = %err, "Analysis invocation error");
            internal()
        }
    }
}
