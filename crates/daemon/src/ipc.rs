//! Unix-socket JSON-RPC 2.0 server for the local admin surface (§6, §10.5). One connection per
//! client, one request-response pair per line — no event streaming, since the admin surface is
//! operator tooling, not a desktop/mobile frontend push channel.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{DaemonError, Result};

/// IPC server configuration.
#[derive(Debug, Clone)]
pub struct IpcConfig {
    pub socket_path: PathBuf,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self { socket_path: lokinet_keystore::default_config_dir().join("lokinet.sock") }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<serde_json::Value>,
    pub id: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<JsonRpcError>,
    pub id: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: Some(result), error: None, id }
    }

    pub fn error(id: serde_json::Value, code: i32, message: String) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: None, error: Some(JsonRpcError { code, message, data: None }), id }
    }
}

/// Handler for admin IPC requests — `RouterService` is the only implementor.
pub trait IpcHandler: Send + Sync {
    fn handle(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = std::result::Result<serde_json::Value, String>> + Send + '_>>;
}

pub struct IpcServer {
    config: IpcConfig,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl IpcServer {
    pub fn new(config: IpcConfig) -> Self {
        Self { config, shutdown_tx: None }
    }

    pub async fn start<H: IpcHandler + 'static>(&mut self, handler: H) -> Result<()> {
        if self.config.socket_path.exists() {
            std::fs::remove_file(&self.config.socket_path)?;
        }
        if let Some(parent) = self.config.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.config.socket_path)
            .map_err(|e| DaemonError::IpcError(format!("failed to bind: {e}")))?;
        info!("admin IPC listening on {:?}", self.config.socket_path);

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let handler = Arc::new(handler);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _addr)) => {
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                if let Err(e) = Self::handle_connection(stream, handler).await {
                                    warn!("connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => error!("accept error: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("admin IPC shutting down");
                    break;
                }
            }
        }

        let _ = std::fs::remove_file(&self.config.socket_path);
        Ok(())
    }

    async fn handle_connection<H: IpcHandler + 'static>(stream: UnixStream, handler: Arc<H>) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = match reader.read_line(&mut line).await {
                Ok(n) => n,
                Err(e) => {
                    debug!("read error: {}", e);
                    break;
                }
            };
            if bytes_read == 0 {
                break;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) if request.jsonrpc != "2.0" => {
                    JsonRpcResponse::error(request.id, -32600, "Invalid Request: jsonrpc must be \"2.0\"".into())
                }
                Ok(request) => match handler.handle(&request.method, request.params).await {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(msg) => JsonRpcResponse::error(request.id, -32000, msg),
                },
                Err(e) => JsonRpcResponse::error(serde_json::Value::Null, -32700, format!("parse error: {e}")),
            };

            let response_str = match serde_json::to_string(&response) {
                Ok(s) => s,
                Err(e) => {
                    error!("serialize error: {}", e);
                    break;
                }
            };

            if writer.write_all(response_str.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }

        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }

    pub fn socket_path(&self) -> &PathBuf {
        &self.config.socket_path
    }
}
