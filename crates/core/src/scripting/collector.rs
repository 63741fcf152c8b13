//! Output stream collection.
//!
//! Drains stdout and stderr concurrently until both are closed by the
//! child. Each stream keeps at most `max_bytes`; anything past that is
//! read and discarded so the child never blocks on a full pipe.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ScriptError;

/// Bytes captured from one output stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStream {
    pub bytes: Vec<u8>,
    /// `true` if bytes beyond the capture limit were discarded.
    pub truncated: bool,
}

impl CapturedStream {
    /// Lossy UTF-8 text with trailing whitespace and newlines removed.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).trim_end().to_string()
    }
}

/// Everything the child wrote before closing its output streams.
#[derive(Debug, Clone, Default)]
pub struct CollectedOutput {
    pub stdout: CapturedStream,
    pub stderr: CapturedStream,
}

/// Read both streams to end-of-stream.
///
/// Returns only once both readers have observed EOF, so callers may
/// treat the result as complete.
pub async fn collect<O, E>(
    stdout: Option<O>,
    stderr: Option<E>,
    max_bytes: usize,
) -> Result<CollectedOutput, ScriptError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let (stdout, stderr) =
        tokio::try_join!(read_stream(stdout, max_bytes), read_stream(stderr, max_bytes))?;
    Ok(CollectedOutput { stdout, stderr })
}

/// Read an entire stream, keeping the first `max_bytes`.
async fn read_stream<R: AsyncRead + Unpin>(
    handle: Option<R>,
    max_bytes: usize,
) -> Result<CapturedStream, ScriptError> {
    let Some(mut reader) = handle else {
        return Ok(CapturedStream::default());
    };

    let mut bytes = Vec::new();
    (&mut reader)
        .take(max_bytes as u64)
        .read_to_end(&mut bytes)
        .await?;

    let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    if discarded > 0 {
        tracing::warn!(kept = bytes.len(), discarded, "Script output exceeded capture limit");
    }

    Ok(CapturedStream {
        bytes,
        truncated: discarded > 0,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
