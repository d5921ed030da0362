//! Admin IPC client, adapted from the teacher's Unix-socket JSON-RPC client: each request opens
//! a fresh connection, writes one line of JSON, reads one line back.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use crate::protocol::{
    ExitToggleResult, LookupNameParams, LookupNameResult, NodeDbSummaryResult, RpcRequest, RpcResponse,
    StatusResult,
};
use crate::{IpcError, Result};

/// Admin client talking to a running router's Unix-socket JSON-RPC endpoint (§6, §10.5).
pub struct IpcClient {
    socket_path: PathBuf,
    request_id: AtomicU64,
}

impl IpcClient {
    /// Create a new client. Doesn't establish a connection; each request dials fresh.
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path, request_id: AtomicU64::new(1) }
    }

    /// Create a client and verify the daemon is actually reachable via a `status` call.
    pub async fn connect(socket_path: &PathBuf) -> Result<Self> {
        let client = Self::new(socket_path.clone());
        client.status().await?;
        Ok(client)
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send a raw JSON-RPC request and return its `result` value.
    pub async fn send_request(&self, method: &str, params: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound || e.kind() == std::io::ErrorKind::ConnectionRefused {
                IpcError::DaemonNotRunning
            } else {
                IpcError::ConnectionFailed(e.to_string())
            }
        })?;

        let (reader, mut writer) = stream.into_split();

        let request = RpcRequest::new(method, params, self.next_id());
        let request_json = serde_json::to_string(&request)?;
        debug!("sending request: {}", request_json);

        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut response_str = String::new();
        reader.read_line(&mut response_str).await?;
        debug!("received response: {}", response_str.trim());

        let response: RpcResponse =
            serde_json::from_str(&response_str).map_err(|e| IpcError::InvalidResponse(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(IpcError::DaemonError { code: error.code, message: error.message });
        }

        Ok(response.result.unwrap_or(serde_json::Value::Null))
    }

    pub async fn status(&self) -> Result<StatusResult> {
        let result = self.send_request("status", None).await?;
        serde_json::from_value(result).map_err(|e| IpcError::InvalidResponse(e.to_string()))
    }

    pub async fn exit_enable(&self) -> Result<ExitToggleResult> {
        let result = self.send_request("exit_enable", None).await?;
        serde_json::from_value(result).map_err(|e| IpcError::InvalidResponse(e.to_string()))
    }

    pub async fn exit_disable(&self) -> Result<ExitToggleResult> {
        let result = self.send_request("exit_disable", None).await?;
        serde_json::from_value(result).map_err(|e| IpcError::InvalidResponse(e.to_string()))
    }

    pub async fn lookup_name(&self, name: impl Into<String>) -> Result<LookupNameResult> {
        let params = LookupNameParams { name: name.into() };
        let result = self.send_request("lookup_name", Some(serde_json::to_value(params)?)).await?;
        serde_json::from_value(result).map_err(|e| IpcError::InvalidResponse(e.to_string()))
    }

    pub async fn dump_nodedb_summary(&self) -> Result<NodeDbSummaryResult> {
        let result = self.send_request("dump_nodedb_summary", None).await?;
        serde_json::from_value(result).map_err(|e| IpcError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_stores_socket_path() {
        let client = IpcClient::new(PathBuf::from("/tmp/test.sock"));
        assert_eq!(client.socket_path, PathBuf::from("/tmp/test.sock"));
    }

    #[test]
    fn request_id_increments_monotonically() {
        let client = IpcClient::new(PathBuf::from("/tmp/test.sock"));
        assert_eq!(client.next_id(), 1);
        assert_eq!(client.next_id(), 2);
        assert_eq!(client.next_id(), 3);
    }
}
