//! Stdin encoding.
//!
//! Turns the request payload into bytes according to the calling
//! convention, writes them to the child's stdin and closes it so the
//! script sees end-of-input.

use std::io::ErrorKind;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::invocation::{CallingConvention, Payload};
use crate::error::ScriptError;

/// Serialize `payload` into the bytes the script expects on stdin.
///
/// | Payload | `Plain`         | `Json`                |
/// |---------|-----------------|-----------------------|
/// | `Bytes` | verbatim        | verbatim              |
/// | `Text`  | UTF-8 verbatim  | JSON string literal   |
/// | `Json`  | compact JSON    | compact JSON          |
pub fn encode(
    payload: Option<&Payload>,
    convention: CallingConvention,
) -> Result<Option<Vec<u8>>, ScriptError> {
    let Some(payload) = payload else {
        return Ok(None);
    };

    let bytes = match (payload, convention) {
        (Payload::Bytes(bytes), _) => bytes.clone(),
        (Payload::Text(text), CallingConvention::Plain) => text.as_bytes().to_vec(),
        (Payload::Text(text), CallingConvention::Json) => {
            serde_json::to_vec(text).map_err(ScriptError::InvalidPayload)?
        }
        (Payload::Json(value), _) => {
            serde_json::to_vec(value).map_err(ScriptError::InvalidPayload)?
        }
    };
    Ok(Some(bytes))
}

/// Write `input` (if any) to `stdin`, then close it.
///
/// Returns the number of bytes delivered. A script that exits or closes
/// its stdin without reading everything is not an error here; the
/// arbiter judges the run by its exit status.
pub async fn write_input<W>(stdin: Option<W>, input: Option<&[u8]>) -> Result<usize, ScriptError>
where
    W: AsyncWrite + Unpin,
{
    let Some(mut stdin) = stdin else {
        return Ok(0);
    };

    let mut written = 0;
    if let Some(bytes) = input.filter(|b| !b.is_empty()) {
        match stdin.write_all(bytes).await {
            Ok(()) => written = bytes.len(),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!(bytes = bytes.len(), "Script closed stdin before reading input");
                return Ok(0);
            }
            Err(e) => return Err(ScriptError::Io(e)),
        }
    }

    match stdin.shutdown().await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
        Err(e) => return Err(ScriptError::Io(e)),
    }
    drop(stdin);

    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
