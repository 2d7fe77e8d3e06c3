//! `Content-Length` framing for JSON-RPC messages.

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no Content-Length header")]
    MissingContentLength,

    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
}

/// Largest body accepted from a client
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

impl RpcError {
    /// Whether the stream can no longer be read
    pub fn is_fatal(&self) -> bool {
        matches!(self, RpcError::Io(_))
    }
}

/// Serialize `message` and prefix it with its header
pub fn encode_message<T: Serialize>(message: &T) -> Result<Vec<u8>, RpcError> {
    let content = serde_json::to_vec(message)?;
    let mut framed = format!("Content-Length: {}\r\n\r\n", content.len()).into_bytes();
    framed.extend_from_slice(&content);
    Ok(framed)
}

/// Read one framed message body. Returns `Ok(None)` on a clean end of input.
///
/// Header lines without a `:` are logged and skipped; other headers
/// (e.g. `Content-Type`) are ignored.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Vec<u8>>, RpcError>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await?;
        if read == 0 {
            if saw_header {
                return Err(RpcError::Io(std::io::ErrorKind::UnexpectedEof.into()));
            }
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            if !saw_header {
                // Stray blank line between messages
                continue;
            }
            break;
        }
        saw_header = true;

        let Some((name, value)) = text.split_once(':') else {
            tracing::warn!(header = %text, "Skipping malformed header");
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let value = value.trim();
            let length = value
                .parse::<usize>()
                .ok()
                .filter(|length| *length <= MAX_CONTENT_LENGTH)
                .ok_or_else(|| RpcError::InvalidContentLength(value.to_string()))?;
            content_length = Some(length);
        }
    }

    let length = content_length.ok_or(RpcError::MissingContentLength)?;
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}
