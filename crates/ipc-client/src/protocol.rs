//! JSON-RPC 2.0 protocol types for the local admin surface (§6, §10.5): a JSON-RPC 2.0 envelope
//! carrying lokinet-specific method params/results.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>, id: u64) -> Self {
        Self { jsonrpc: "2.0", method: method.into(), params, id }
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: serde_json::Value,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Result of the `status` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResult {
    pub mode: String,
    pub router_id: String,
    pub netid: String,
    pub connected_routers: u32,
    pub session_count: usize,
    pub uptime_secs: u64,
    pub exit_enabled: bool,
}

/// Params for `lookup_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupNameParams {
    pub name: String,
}

/// Result of `lookup_name`: the resolved `.loki` address, if the name was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupNameResult {
    pub name: String,
    pub address: Option<String>,
}

/// Result of `exit_enable`/`exit_disable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitToggleResult {
    pub enabled: bool,
}

/// Result of `dump_nodedb_summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDbSummaryResult {
    pub router_count: usize,
    pub introset_count: usize,
    pub pending_transactions: usize,
}
