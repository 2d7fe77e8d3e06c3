use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use super::rpc::{self, RpcError};

/// Reads framed message bodies from the client and writes framed replies
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next message body, skipping frames that cannot be decoded.
    /// `Ok(None)` means the client closed its end.
    pub async fn next(&mut self) -> Result<Option<Vec<u8>>, RpcError> {
        loop {
            match rpc::read_message(&mut self.reader).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable message"),
            }
        }
    }

    pub async fn write<T: Serialize>(&mut self, message: &T) -> Result<(), RpcError> {
        let framed = rpc::encode_message(message)?;
        self.writer.write_all(&framed).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
