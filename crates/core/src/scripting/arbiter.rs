//! Completion arbitration.
//!
//! Pairs the exit status of a fully drained process with its output and
//! decides the single outcome of the invocation.

use std::process::ExitStatus;
use std::time::Duration;

use super::collector::CollectedOutput;
use super::decoder;
use super::invocation::{CallingConvention, ScriptOutput};
use crate::error::ScriptError;

/// Exit code reported when the process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Decide the outcome of a process that has exited and been drained.
///
/// - non-zero status: [`ScriptError::NonZeroExit`] carrying both streams.
/// - zero status, stdout past the capture limit:
///   [`ScriptError::OutputTooLarge`]. A truncated result is never a success.
/// - zero status, `Json` convention: stdout must parse, else
///   [`ScriptError::MalformedOutput`].
/// - zero status, `Plain` convention: the trimmed stdout as-is.
pub fn arbitrate(
    status: ExitStatus,
    output: CollectedOutput,
    convention: CallingConvention,
    elapsed: Duration,
) -> Result<ScriptOutput, ScriptError> {
    let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
    let stdout_truncated = output.stdout.truncated;
    let stdout_kept = output.stdout.bytes.len();
    let stderr_truncated = output.stderr.truncated;
    let stdout = output.stdout.text();
    let stderr = output.stderr.text();

    if !status.success() {
        return Err(ScriptError::NonZeroExit {
            exit_code,
            stdout,
            stderr,
        });
    }

    if stdout_truncated {
        return Err(ScriptError::OutputTooLarge {
            limit_bytes: stdout_kept,
        });
    }

    let decoded = match convention {
        CallingConvention::Plain => None,
        CallingConvention::Json => Some(decoder::decode_value(&stdout)?),
    };

    Ok(ScriptOutput {
        stdout,
        stderr,
        exit_code,
        duration_ms: elapsed.as_millis() as u64,
        stderr_truncated,
        decoded,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
