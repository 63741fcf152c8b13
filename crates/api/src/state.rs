use sportif_core::scripting::orchestrator::ScriptOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the orchestrator shares its internals.
#[derive(Clone)]
pub struct AppState {
    /// Runs the external analysis scripts.
    pub orchestrator: ScriptOrchestrator,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            orchestrator: ScriptOrchestrator::new(config.orchestrator.clone()),
        }
    }
}
