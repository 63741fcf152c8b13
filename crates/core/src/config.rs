use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Interpreter used when `ANALYSIS_INTERPRETER` is unset.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Scripts directory used when `ANALYSIS_SCRIPTS_DIR` is unset.
pub const DEFAULT_SCRIPTS_DIR: &str = "python_scripts";

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Per-stream capture limit (10 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Process-wide settings for the script orchestrator.
///
/// Read once at startup and shared immutably by every invocation.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interpreter command, resolved through `PATH` when not absolute.
    pub interpreter: String,
    /// Directory holding the analysis scripts. Created on first use.
    pub scripts_root: PathBuf,
    /// Upper bound on the interpreter `--version` probe.
    pub probe_timeout: Duration,
    /// Deadline applied to requests that do not carry their own.
    pub default_deadline: Option<Duration>,
    /// Bytes kept per output stream; the rest is drained and discarded.
    pub max_output_bytes: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            scripts_root: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            default_deadline: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default          |
    /// |-------------------------------|------------------|
    /// | `ANALYSIS_INTERPRETER`        | `python3`        |
    /// | `ANALYSIS_SCRIPTS_DIR`        | `python_scripts` |
    /// | `ANALYSIS_PROBE_TIMEOUT_SECS` | `5`              |
    /// | `ANALYSIS_TIMEOUT_SECS`       | `120` (`0` = no deadline) |
    /// | `ANALYSIS_MAX_OUTPUT_BYTES`   | `10485760`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interpreter = lookup("ANALYSIS_INTERPRETER")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string());
        if interpreter.is_empty() {
            return Err(ConfigError::Empty("ANALYSIS_INTERPRETER"));
        }

        let scripts_root = lookup("ANALYSIS_SCRIPTS_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPTS_DIR));

        let probe_timeout_secs: u64 = parse_var(
            &lookup,
            "ANALYSIS_PROBE_TIMEOUT_SECS",
            DEFAULT_PROBE_TIMEOUT_SECS,
            "u64",
        )?;

        let timeout_secs: u64 =
            parse_var(&lookup, "ANALYSIS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS, "u64")?;

        let max_output_bytes: usize = parse_var(
            &lookup,
            "ANALYSIS_MAX_OUTPUT_BYTES",
            DEFAULT_MAX_OUTPUT_BYTES,
            "usize",
        )?;

        Ok(Self {
            interpreter,
            scripts_root,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            default_deadline: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            max_output_bytes,
        })
    }
}

fn parse_var<F, T>(
    lookup: &F,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
