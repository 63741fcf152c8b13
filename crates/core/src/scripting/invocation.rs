//! Invocation request and result types.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScriptError;

/// How a payload is turned into stdin bytes and stdout into a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingConvention {
    /// Text in, raw trimmed text out.
    #[default]
    Plain,
    /// JSON on stdin, JSON expected on stdout.
    Json,
}

/// Data written to the script's stdin.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque bytes, written verbatim under every convention.
    Bytes(Vec<u8>),
    Text(String),
    Json(Value),
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A single request to run one script once.
///
/// Built with [`InvocationRequest::new`] and the `with_*` methods, then
/// handed to the orchestrator by value.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    script: String,
    payload: Option<Payload>,
    args: Vec<String>,
    convention: CallingConvention,
    deadline: Option<Duration>,
}

impl InvocationRequest {
    /// Create a request for the script named `script`.
    ///
    /// Fails with [`ScriptError::InvalidIdentifier`] when the name is empty.
    pub fn new(script: impl Into<String>) -> Result<Self, ScriptError> {
        let script = script.into();
        if script.trim().is_empty() {
            return Err(ScriptError::InvalidIdentifier(script));
        }
        Ok(Self {
            script,
            payload: None,
            args: Vec::new(),
            convention: CallingConvention::default(),
            deadline: None,
        })
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Extra arguments passed after the script path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_convention(mut self, convention: CallingConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Override the configured default deadline for this request.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

/// Output of a script that exited with status zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptOutput {
    /// Stdout decoded as UTF-8 (lossy) with trailing whitespace trimmed.
    pub stdout: String,
    /// Stderr, kept separate from stdout.
    pub stderr: String,
    pub exit_code: i32,
    /// Wall-clock milliseconds from invocation start to process exit.
    pub duration_ms: u64,
    /// Whether stderr exceeded the capture limit. Stdout never does on a
    /// successful run.
    pub stderr_truncated: bool,
    /// Stdout parsed as JSON. Always present under [`CallingConvention::Json`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<Value>,
}

impl ScriptOutput {
    /// Decode the result into `T`.
    ///
    /// A shape mismatch is reported as [`ScriptError::MalformedOutput`], the
    /// same as unparseable text.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ScriptError> {
        match &self.decoded {
            Some(value) => T::deserialize(value).map_err(|source| ScriptError::MalformedOutput {
                stdout: self.stdout.clone(),
                source,
            }),
            None => super::decoder::decode_as(&self.stdout),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
