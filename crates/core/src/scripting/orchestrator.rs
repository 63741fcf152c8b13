//! Central script orchestrator.
//!
//! Coordinates the interpreter probe, script lookup, process launch and
//! completion arbitration for each invocation. Every invocation runs on
//! its own tokio task; the returned [`Invocation`] owns that task's join
//! handle, so its outcome (including a panic) is always observed.
//! [`ScriptOrchestrator::shutdown`] cancels whatever is still running and
//! waits until every process has been killed and reaped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use uuid::Uuid;

use super::arbiter;
use super::encoder;
use super::invocation::{InvocationRequest, ScriptOutput};
use super::launcher;
use super::locator::ScriptLocator;
use super::probe::InterpreterProbe;
use crate::config::OrchestratorConfig;
use crate::error::ScriptError;

/// Runs external analysis scripts and reports typed outcomes.
///
/// Cheap to clone; clones share configuration and the launch counter.
#[derive(Debug, Clone)]
pub struct ScriptOrchestrator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: OrchestratorConfig,
    probe: InterpreterProbe,
    locator: ScriptLocator,
    launches: AtomicUsize,
    /// Parent of every invocation's cancellation token.
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

/// Handle to one in-flight invocation.
///
/// Await [`outcome`](Self::outcome) to get the result. Dropping the handle
/// without awaiting it cancels the invocation and kills the process.
#[derive(Debug)]
pub struct Invocation {
    id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<Result<ScriptOutput, ScriptError>>,
    _guard: DropGuard,
}

impl Invocation {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Request cancellation. The outcome becomes [`ScriptError::Cancelled`]
    /// unless the process already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this invocation, usable after `self` is moved.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the invocation to finish.
    pub async fn outcome(self) -> Result<ScriptOutput, ScriptError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(invocation_id = %self.id, error = %e, "Invocation worker lost");
                Err(ScriptError::WorkerLost(e.to_string()))
            }
        }
    }
}

enum Interrupt {
    Finished(Result<launcher::Exited, ScriptError>),
    TimedOut,
    Cancelled,
}

impl ScriptOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        let probe = InterpreterProbe::new(config.interpreter.clone(), config.probe_timeout);
        let locator = ScriptLocator::new(config.scripts_root.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                probe,
                locator,
                launches: AtomicUsize::new(0),
                shutdown: CancellationToken::new(),
                tasks: TaskTracker::new(),
            }),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    /// Number of script processes this orchestrator has attempted to spawn.
    ///
    /// Probe processes are not counted.
    pub fn launch_count(&self) -> usize {
        self.inner.launches.load(Ordering::Relaxed)
    }

    /// Whether the configured interpreter answers a version query.
    pub async fn interpreter_available(&self) -> bool {
        self.inner.probe.is_available().await
    }

    /// Start an invocation on a new task and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn invoke(&self, request: InvocationRequest) -> Invocation {
        let id = Uuid::now_v7();
        let cancel = self.inner.shutdown.child_token();
        let span = tracing::info_span!("invocation", invocation_id = %id, script = %request.script());

        let inner = Arc::clone(&self.inner);
        let task = self
            .inner
            .tasks
            .spawn(run_invocation(inner, request, cancel.clone()).instrument(span));

        Invocation {
            id,
            _guard: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    /// Invoke and wait for the outcome.
    pub async fn run(&self, request: InvocationRequest) -> Result<ScriptOutput, ScriptError> {
        self.invoke(request).outcome().await
    }

    /// Cancel every in-flight invocation and wait until their processes
    /// are killed and reaped.
    ///
    /// Invocations started afterwards fail with [`ScriptError::Cancelled`]
    /// without launching anything.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.tasks.close();
        let in_flight = self.inner.tasks.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "Cancelling in-flight script invocations");
        }
        self.inner.tasks.wait().await;
    }
}

async fn run_invocation(
    inner: Arc<Inner>,
    request: InvocationRequest,
    cancel: CancellationToken,
) -> Result<ScriptOutput, ScriptError> {
    let started = Instant::now();

    let result = drive(&inner, &request, &cancel, started).await;

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(output) => tracing::info!(
            exit_code = output.exit_code,
            duration_ms,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            stderr_truncated = output.stderr_truncated,
            "Script invocation succeeded",
        ),
        Err(e) => tracing::warn!(duration_ms, error = %e, "Script invocation failed"),
    }
    result
}

async fn drive(
    inner: &Inner,
    request: &InvocationRequest,
    cancel: &CancellationToken,
    started: Instant,
) -> Result<ScriptOutput, ScriptError> {
    if !inner.probe.is_available().await {
        return Err(ScriptError::InterpreterUnavailable {
            interpreter: inner.config.interpreter.clone(),
        });
    }

    let script_path = inner.locator.locate(request.script()).await?;
    let input = encoder::encode(request.payload(), request.convention())?;
    let deadline = request.deadline().or(inner.config.default_deadline);

    if cancel.is_cancelled() {
        return Err(ScriptError::Cancelled {
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
    }

    inner.launches.fetch_add(1, Ordering::Relaxed);
    let mut process = launcher::launch(&inner.config.interpreter, &script_path, request.args())?;
    tracing::info!(
        pid = process.id(),
        path = %script_path.display(),
        input_bytes = input.as_ref().map_or(0, Vec::len),
        deadline_ms = deadline.map(|d| d.as_millis() as u64),
        "Script process launched",
    );

    let interrupt = tokio::select! {
        biased;
        _ = cancel.cancelled() => Interrupt::Cancelled,
        _ = expire(deadline) => Interrupt::TimedOut,
        exited = process.run_to_exit(input.as_deref(), inner.config.max_output_bytes) => {
            Interrupt::Finished(exited)
        }
    };

    match interrupt {
        Interrupt::Finished(exited) => {
            let exited = exited?;
            arbiter::arbitrate(
                exited.status,
                exited.output,
                request.convention(),
                started.elapsed(),
            )
        }
        Interrupt::TimedOut => {
            process.terminate().await;
            Err(ScriptError::TimedOut {
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
        }
        Interrupt::Cancelled => {
            process.terminate().await;
            Err(ScriptError::Cancelled {
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
        }
    }
}

/// Resolve after `deadline`, or never when there is none.
async fn expire(deadline: Option<Duration>) {
    match deadline {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
