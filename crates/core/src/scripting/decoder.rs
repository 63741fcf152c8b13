//! Structured result decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ScriptError;

/// Parse collected stdout as a JSON value.
pub fn decode_value(stdout: &str) -> Result<Value, ScriptError> {
    decode_as(stdout)
}

/// Parse collected stdout directly into `T`.
///
/// Any parse or shape error becomes [`ScriptError::MalformedOutput`],
/// never a process failure.
pub fn decode_as<T: DeserializeOwned>(stdout: &str) -> Result<T, ScriptError> {
    serde_json::from_str(stdout).map_err(|source| ScriptError::MalformedOutput {
        stdout: stdout.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_valid_json() {
        let value = decode_value(r#"{"grade": "Excellent", "feedback": []}"#).expect("decode");
        assert_eq!(value["grade"], "Excellent");
    }

    #[test]
    fn broken_json_is_malformed() {
        assert_matches!(
            decode_value("{not valid json"),
            Err(ScriptError::MalformedOutput { stdout, .. }) => {
                assert_eq!(stdout, "{not valid json");
            }
        );
    }

    #[test]
    fn empty_output_is_malformed() {
        assert_matches!(decode_value(""), Err(ScriptError::MalformedOutput { .. }));
    }

    #[test]
    fn log_line_before_json_is_malformed() {
        let stdout = "Analyzing Squats...\n{\"grade\": \"Good\"}";
        assert_matches!(decode_value(stdout), Err(ScriptError::MalformedOutput { .. }));
    }
}
