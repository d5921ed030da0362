//! Admin client for the local JSON-RPC control surface (§6, §10.5): a thin client library for
//! `status`/`exit_enable`/`exit_disable`/`lookup_name`/`dump_nodedb_summary` against the
//! router's Unix-socket admin endpoint. Used by `lokinet-cli` and anything else that wants to
//! talk to a running router without linking the protocol crates directly.

mod client;
mod protocol;

pub use client::IpcClient;
pub use protocol::{
    ExitToggleResult, LookupNameParams, LookupNameResult, NodeDbSummaryResult, RpcError, RpcRequest,
    RpcResponse, StatusResult,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("daemon returned error {code}: {message}")]
    DaemonError { code: i32, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IpcError>;
