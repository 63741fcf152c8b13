//! Interpreter availability probe.
//!
//! Runs `<interpreter> --version` and reports whether it exited cleanly
//! within the configured wait. A negative answer is an ordinary result.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Checks that the configured interpreter can be executed.
#[derive(Debug, Clone)]
pub struct InterpreterProbe {
    interpreter: String,
    timeout: Duration,
}

impl InterpreterProbe {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Spawn one short-lived version query and reap it.
    ///
    /// Returns `false` when the binary cannot be started, exits non-zero,
    /// or does not finish within the timeout (in which case it is killed).
    pub async fn is_available(&self) -> bool {
        let spawned = Command::new(&self.interpreter)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(interpreter = %self.interpreter, error = %e, "Interpreter probe failed to spawn");
                return false;
            }
        };

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                if !status.success() {
                    tracing::debug!(interpreter = %self.interpreter, %status, "Interpreter probe exited non-zero");
                }
                status.success()
            }
            Ok(Err(e)) => {
                tracing::debug!(interpreter = %self.interpreter, error = %e, "Interpreter probe wait failed");
                false
            }
            Err(_elapsed) => {
                tracing::warn!(
                    interpreter = %self.interpreter,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Interpreter probe timed out",
                );
                // `kill` also reaps the child.
                let _ = child.kill().await;
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use super::*;

    /// Write an executable stand-in interpreter that runs `body`.
    fn fake_interpreter(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-interpreter");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write interpreter");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod interpreter");
        path
    }

    #[tokio::test]
    async fn bash_is_available() {
        let probe = InterpreterProbe::new("bash", Duration::from_secs(5));
        assert!(probe.is_available().await);
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let probe = InterpreterProbe::new("definitely-not-an-interpreter-7f3a", Duration::from_secs(5));
        assert!(!probe.is_available().await);
    }

    #[tokio::test]
    async fn non_zero_version_query_is_unavailable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let interpreter = fake_interpreter(dir.path(), "exit 3");
        let probe = InterpreterProbe::new(interpreter.to_str().expect("path"), Duration::from_secs(5));
        assert!(!probe.is_available().await);
    }

    #[tokio::test]
    async fn hanging_version_query_is_unavailable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let interpreter = fake_interpreter(dir.path(), "sleep 30");
        let probe =
            InterpreterProbe::new(interpreter.to_str().expect("path"), Duration::from_millis(200));
        assert!(!probe.is_available().await);
    }
}
