use std::path::PathBuf;

/// Failure kinds produced by a single script invocation.
///
/// Every variant is returned to the caller as a value. Mapping these to
/// user-facing messages or status codes is the caller's job.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The configured interpreter did not answer the version probe.
    #[error("Interpreter unavailable: {interpreter}")]
    InterpreterUnavailable { interpreter: String },

    /// The script identifier is empty or is not a plain file name.
    #[error("Invalid script identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The resolved script path does not reference an existing file.
    #[error("Script not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The request payload could not be serialized for stdin.
    #[error("Payload could not be encoded: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// The OS refused to start the process.
    #[error("Failed to launch {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran to completion and exited with a non-zero status.
    #[error("Script exited with code {exit_code}: {}", join_diagnostics(.stdout, .stderr))]
    NonZeroExit {
        /// Process exit code (`-1` if killed by signal).
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// The process exited cleanly but its stdout is not the expected JSON.
    #[error("Malformed script output: {source}")]
    MalformedOutput {
        stdout: String,
        #[source]
        source: serde_json::Error,
    },

    /// The process exited cleanly but stdout went past the capture limit,
    /// so only a prefix of the result was kept.
    #[error("Script output exceeded {limit_bytes} bytes")]
    OutputTooLarge { limit_bytes: usize },

    /// The invocation deadline elapsed; the process was killed.
    #[error("Script timed out after {elapsed_ms}ms")]
    TimedOut { elapsed_ms: u64 },

    /// The caller cancelled the invocation; the process was killed.
    #[error("Script invocation cancelled after {elapsed_ms}ms")]
    Cancelled { elapsed_ms: u64 },

    /// Writing stdin, reading output, or waiting on the process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The task driving the invocation panicked or was aborted.
    #[error("Invocation worker lost: {0}")]
    WorkerLost(String),
}

impl ScriptError {
    /// Diagnostic text captured from the process, if this failure has any.
    ///
    /// For a non-zero exit this is stderr followed by stdout, so output a
    /// script printed on either stream is preserved.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            Self::NonZeroExit { stdout, stderr, .. } => Some(join_diagnostics(stdout, stderr)),
            Self::MalformedOutput { stdout, .. } => Some(stdout.clone()),
            _ => None,
        }
    }
}

fn join_diagnostics(stdout: &str, stderr: &str) -> String {
    match (stderr.is_empty(), stdout.is_empty()) {
        (true, _) => stdout.to_string(),
        (false, true) => stderr.to_string(),
        (false, false) => format!("{stderr}\n{stdout}"),
    }
}

/// Invalid process-wide configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Two settings that are individually valid but contradict each other.
    #[error("{var} {reason}")]
    Conflict { var: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
