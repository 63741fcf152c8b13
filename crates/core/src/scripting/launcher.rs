//! Process launching and the per-invocation process handle.
//!
//! [`launch`] spawns `<interpreter> <script> <args...>` with all three
//! standard streams piped. The returned [`ProcessHandle`] is owned by
//! exactly one invocation and drives encode → collect → wait in that order.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use super::collector::{self, CollectedOutput};
use super::encoder;
use crate::error::ScriptError;

/// One live external process.
///
/// `kill_on_drop(true)` is set on the child, so dropping the handle
/// mid-run never leaks a process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

/// A process that has closed its output streams and been reaped.
#[derive(Debug)]
pub struct Exited {
    pub status: ExitStatus,
    pub output: CollectedOutput,
}

/// Spawn `interpreter` on `script` with `args`.
///
/// Fails with [`ScriptError::LaunchFailed`] if the OS cannot start the
/// process (missing executable, permission denied, ...).
pub fn launch(interpreter: &str, script: &Path, args: &[String]) -> Result<ProcessHandle, ScriptError> {
    let mut child = Command::new(interpreter)
        .arg(script)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ScriptError::LaunchFailed {
            program: interpreter.to_string(),
            source,
        })?;

    tracing::debug!(pid = child.id(), script = %script.display(), "Script process spawned");

    Ok(ProcessHandle {
        stdin: child.stdin.take(),
        stdout: child.stdout.take(),
        stderr: child.stderr.take(),
        child,
    })
}

impl ProcessHandle {
    /// OS process id, while the process has not yet been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Feed `input`, drain both output streams, then reap the process.
    ///
    /// Stdin is fully written and closed before any output is read, and
    /// the exit status is only fetched after both output streams have
    /// reached end-of-stream.
    pub async fn run_to_exit(
        &mut self,
        input: Option<&[u8]>,
        max_output_bytes: usize,
    ) -> Result<Exited, ScriptError> {
        let written = encoder::write_input(self.stdin.take(), input).await?;
        tracing::trace!(bytes = written, "Script stdin closed");

        let output =
            collector::collect(self.stdout.take(), self.stderr.take(), max_output_bytes).await?;

        let status = self.child.wait().await?;
        Ok(Exited { status, output })
    }

    /// Kill the process (if still running) and reap it.
    pub async fn terminate(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "Failed to kill script process");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::scripting::test_helpers::write_script;

    #[tokio::test]
    async fn missing_interpreter_is_a_launch_failure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write_script(dir.path(), "noop.sh", "exit 0\n");

        let result = launch("no-such-interpreter-91c2", &script, &[]);

        assert_matches!(result, Err(ScriptError::LaunchFailed { program, source }) => {
            assert_eq!(program, "no-such-interpreter-91c2");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        });
    }

    #[tokio::test]
    async fn args_follow_the_script_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write_script(dir.path(), "args.sh", "echo \"$1|$2\"\n");

        let mut handle =
            launch("bash", &script, &["first".to_string(), "second".to_string()]).expect("launch");
        let exited = handle.run_to_exit(None, 1024).await.expect("run");

        assert!(exited.status.success());
        assert_eq!(exited.output.stdout.text(), "first|second");
    }

    #[tokio::test]
    async fn stdin_is_closed_before_output_is_read() {
        let dir = tempfile::tempdir().expect("temp dir");
        // `cat` only terminates once it sees end-of-input.
        let script = write_script(dir.path(), "echo.sh", "cat\necho \"<eof>\"\n");

        let mut handle = launch("bash", &script, &[]).expect("launch");
        let exited = handle
            .run_to_exit(Some(b"payload"), 1024)
            .await
            .expect("run");

        assert_eq!(exited.output.stdout.text(), "payload<eof>");
    }

    #[tokio::test]
    async fn streams_stay_separate() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write_script(dir.path(), "both.sh", "echo out\necho err >&2\nexit 4\n");

        let mut handle = launch("bash", &script, &[]).expect("launch");
        let exited = handle.run_to_exit(None, 1024).await.expect("run");

        assert_eq!(exited.status.code(), Some(4));
        assert_eq!(exited.output.stdout.text(), "out");
        assert_eq!(exited.output.stderr.text(), "err");
    }

    #[tokio::test]
    async fn terminate_kills_a_running_process() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = write_script(dir.path(), "sleep.sh", "sleep 60\n");

        let mut handle = launch("bash", &script, &[]).expect("launch");
        assert!(handle.id().is_some());

        tokio::time::timeout(Duration::from_secs(5), handle.terminate())
            .await
            .expect("terminate should not hang");
        assert!(handle.id().is_none(), "process should be reaped");
    }
}
