use sportif_core::config::OrchestratorConfig;
use sportif_core::error::ConfigError;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `150`). Must exceed the
    /// default analysis deadline; see [`ServerConfig::validate`].
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Script orchestrator settings (`ANALYSIS_*` variables).
    pub orchestrator: OrchestratorConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `150`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// See [`OrchestratorConfig::from_env`] for the `ANALYSIS_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = parse_env("PORT", "3000", "u16")?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "150", "u64")?;
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "30", "u64")?;

        let orchestrator = OrchestratorConfig::from_env()?;

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            orchestrator,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that contradict each other: the HTTP timeout must be
    /// longer than the default analysis deadline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(deadline) = self.orchestrator.default_deadline {
            if self.request_timeout_secs <= deadline.as_secs() {
                return Err(ConfigError::Conflict {
                    var: "REQUEST_TIMEOUT_SECS",
                    reason: format!(
                        "({}) must exceed ANALYSIS_TIMEOUT_SECS ({})",
                        self.request_timeout_secs,
                        deadline.as_secs()
                    ),
                });
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value: raw.clone(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
