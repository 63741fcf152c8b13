//! Serving with a bounded graceful shutdown.

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use sportif_core::scripting::orchestrator::ScriptOrchestrator;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// How the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Every in-flight request finished within the drain period.
    Graceful,
    /// The drain period elapsed and remaining requests were aborted.
    Forced,
}

/// Serve `app` until `signal` is cancelled.
///
/// After the signal, in-flight requests get `drain` to finish. Either way,
/// every script still running is killed and reaped before this returns.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    orchestrator: ScriptOrchestrator,
    signal: CancellationToken,
    drain: Duration,
) -> std::io::Result<Shutdown> {
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal.clone().cancelled_owned())
        .into_future();

    let outcome = tokio::select! {
        result = server => result.map(|()| Shutdown::Graceful),
        () = drain_deadline(&signal, drain) => {
            tracing::warn!(drain_secs = drain.as_secs(), "Shutdown drain period elapsed, aborting in-flight requests");
            Ok(Shutdown::Forced)
        }
    };

    orchestrator.shutdown().await;
    outcome
}

async fn drain_deadline(signal: &CancellationToken, drain: Duration) {
    signal.cancelled().await;
    tokio::time::sleep(drain).await;
}
