use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};

use super::convert;
use super::rpc::RpcError;
use super::semantic_tokens;
use super::state::DocumentStore;
use super::transport::Transport;
use super::types::{
    error_codes, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, IncomingMessage, InitializeResult, Notification,
    PublishDiagnosticsParams, RequestId, Response, SemanticTokens, SemanticTokensOptions,
    SemanticTokensParams, ServerCapabilities, ServerInfo,
};
use crate::translate::TranslateOptions;

pub const SERVER_NAME: &str = "between-lsp";

/// How the main loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    /// `exit` arrived after `shutdown`
    Clean,
    /// `exit` without `shutdown`, or the client went away
    Unclean,
}

impl ServerExit {
    /// Process exit code the protocol asks for
    pub fn code(&self) -> i32 {
        match self {
            ServerExit::Clean => 0,
            ServerExit::Unclean => 1,
        }
    }
}

/// Outcome of a request handler: a result value or a JSON-RPC error
type HandlerResult = Result<Value, (i64, String)>;

pub struct Server<R, W> {
    transport: Transport<R, W>,
    documents: DocumentStore,
    initialized: bool,
    shutdown_requested: bool,
}

impl<R, W> Server<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, options: TranslateOptions) -> Self {
        Self {
            transport: Transport::new(reader, writer),
            documents: DocumentStore::new(options),
            initialized: false,
            shutdown_requested: false,
        }
    }

    pub fn into_writer(self) -> W {
        self.transport.into_writer()
    }

    pub async fn run(&mut self) -> Result<ServerExit, RpcError> {
        tracing::info!("Starting language server");
        loop {
            let Some(body) = self.transport.next().await? else {
                tracing::info!("Client closed the connection");
                return Ok(self.exit_status());
            };

            let message: IncomingMessage = match serde_json::from_slice(&body) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid JSON-RPC message");
                    self.transport
                        .write(&Response::error(
                            None,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {e}"),
                        ))
                        .await?;
                    continue;
                }
            };

            match (message.id, message.method) {
                (Some(id), Some(method)) => {
                    self.handle_request(id, &method, message.params).await?
                }
                (None, Some(method)) => {
                    if method == "exit" {
                        tracing::info!(clean = self.shutdown_requested, "Exit requested");
                        return Ok(self.exit_status());
                    }
                    self.handle_notification(&method, message.params).await?;
                }
                (Some(id), None) => tracing::debug!(?id, "Ignoring response from client"),
                (None, None) => tracing::warn!("Ignoring message without id or method"),
            }
        }
    }

    fn exit_status(&self) -> ServerExit {
        if self.shutdown_requested {
            ServerExit::Clean
        } else {
            ServerExit::Unclean
        }
    }

    async fn handle_request(
        &mut self,
        id: RequestId,
        method: &str,
        params: Option<Value>,
    ) -> Result<(), RpcError> {
        tracing::debug!(method, ?id, "Request");

        let result = if self.shutdown_requested {
            Err((
                error_codes::INVALID_REQUEST,
                "Server is shutting down".to_string(),
            ))
        } else if !self.initialized && method != "initialize" {
            Err((
                error_codes::SERVER_NOT_INITIALIZED,
                "Server not initialized".to_string(),
            ))
        } else {
            match method {
                "initialize" => self.initialize(),
                "shutdown" => {
                    self.shutdown_requested = true;
                    Ok(Value::Null)
                }
                "textDocument/semanticTokens/full" => {
                    parse_params(params).and_then(|p| self.semantic_tokens_full(p))
                }
                _ => {
                    tracing::warn!(method, "Unknown request");
                    Err((
                        error_codes::METHOD_NOT_FOUND,
                        format!("Method not found: {method}"),
                    ))
                }
            }
        };

        let response = match result {
            Ok(value) => Response::ok(id, value),
            Err((code, message)) => Response::error(Some(id), code, message),
        };
        self.transport.write(&response).await
    }

    async fn handle_notification(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<(), RpcError> {
        tracing::debug!(method, "Notification");

        if !self.initialized {
            tracing::warn!(method, "Dropping notification before initialize");
            return Ok(());
        }

        match method {
            "initialized" => tracing::info!("Client initialized"),
            "textDocument/didOpen" => {
                if let Some(params) = notification_params::<DidOpenTextDocumentParams>(method, params)
                {
                    let doc = params.text_document;
                    self.analyze_and_publish(&doc.uri, doc.text, doc.version)
                        .await?;
                }
            }
            "textDocument/didChange" => {
                if let Some(mut params) =
                    notification_params::<DidChangeTextDocumentParams>(method, params)
                {
                    // Full sync: the last change holds the whole document
                    match params.content_changes.pop() {
                        Some(change) => {
                            let doc = params.text_document;
                            self.analyze_and_publish(&doc.uri, change.text, doc.version)
                                .await?;
                        }
                        None => tracing::debug!("didChange without content changes"),
                    }
                }
            }
            "textDocument/didClose" => {
                if let Some(params) =
                    notification_params::<DidCloseTextDocumentParams>(method, params)
                {
                    let uri = params.text_document.uri;
                    self.documents.close(&uri);
                    self.publish(PublishDiagnosticsParams {
                        uri,
                        version: None,
                        diagnostics: Vec::new(),
                    })
                    .await?;
                }
            }
            _ if method.starts_with("$/") => tracing::debug!(method, "Ignoring optional notification"),
            _ => tracing::warn!(method, "Unknown notification"),
        }
        Ok(())
    }

    fn initialize(&mut self) -> HandlerResult {
        self.initialized = true;
        to_value(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: 1,
                semantic_tokens_provider: SemanticTokensOptions {
                    legend: semantic_tokens::legend(),
                    full: true,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    fn semantic_tokens_full(&self, params: SemanticTokensParams) -> HandlerResult {
        let uri = params.text_document.uri;
        let data = match self.documents.get(&uri) {
            Some(doc) => semantic_tokens::encode(&doc.syntax),
            None => {
                tracing::debug!(uri = %uri, "Semantic tokens for unknown document");
                Vec::new()
            }
        };
        to_value(SemanticTokens { data })
    }

    async fn analyze_and_publish(
        &mut self,
        uri: &str,
        text: String,
        version: i32,
    ) -> Result<(), RpcError> {
        let doc = self.documents.update(uri, text, version);
        let params = PublishDiagnosticsParams {
            uri: uri.to_string(),
            version: Some(doc.version),
            diagnostics: doc.diagnostics.iter().map(convert::diagnostic).collect(),
        };
        self.publish(params).await
    }

    async fn publish(&mut self, params: PublishDiagnosticsParams) -> Result<(), RpcError> {
        let params = serde_json::to_value(params)?;
        self.transport
            .write(&Notification::new("textDocument/publishDiagnostics", params))
            .await
    }
}

fn to_value<T: Serialize>(value: T) -> HandlerResult {
    serde_json::to_value(value).map_err(|e| (error_codes::INVALID_REQUEST, e.to_string()))
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, (i64, String)> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| (error_codes::INVALID_PARAMS, format!("Invalid params: {e}")))
}

fn notification_params<T: DeserializeOwned>(method: &str, params: Option<Value>) -> Option<T> {
    match parse_params(params) {
        Ok(params) => Some(params),
        Err((_, message)) => {
            tracing::warn!(method, error = %message, "Dropping notification");
            None
        }
    }
}
