//! Language server for `.bt` files over stdio.
//!
//! Supports full document sync, diagnostics from every front-end stage and
//! full-document semantic tokens. Logging must never go to stdout here,
//! since stdout carries the protocol.

mod convert;
mod rpc;
mod semantic_tokens;
mod server;
mod state;
mod transport;
pub mod types;

use anyhow::{Context, Result};
use tokio::io::BufReader;

use crate::config::Config;

pub use rpc::{encode_message, read_message, RpcError};
pub use semantic_tokens::{TokenType, TOKEN_TYPES};
pub use server::{Server, ServerExit, SERVER_NAME};

/// Serve the protocol on stdin/stdout until the client exits
pub async fn serve_stdio(config: &Config) -> Result<ServerExit> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let mut server = Server::new(stdin, stdout, config.translate_options());
    let exit = server.run().await.context("Language server failed")?;
    tracing::info!(?exit, "Language server stopped");
    Ok(exit)
}
