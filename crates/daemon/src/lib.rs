//! Lokinet router daemon.
//!
//! Runs the router's logic loop ([`lokinet_router::RouterCore`]) and exposes a local admin
//! surface over a Unix domain socket (§6, §10.5).
//!
//! ## Components
//!
//! - **RouterService**: wraps a running `RouterCore`, implements `IpcHandler`.
//! - **IpcServer**: JSON-RPC 2.0 over a Unix domain socket at `<datadir>/lokinet.sock`.
//!
//! ## IPC Methods
//!
//! - `status` - router mode, id, netid, connection/session counts, uptime, exit-mode state
//! - `exit_enable` / `exit_disable` - toggle exit-mode routing
//! - `lookup_name` - resolve a `.loki` address against the local introset cache
//! - `dump_nodedb_summary` - counts of known routers, introsets, and pending DHT transactions

mod ipc;
mod service;

pub use ipc::{IpcConfig, IpcHandler, IpcServer};
pub use service::RouterService;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("router error: {0}")]
    RouterError(#[from] lokinet_router::RouterError),

    #[error("exit error: {0}")]
    ExitError(#[from] lokinet_exit::ExitError),

    #[error("already running")]
    AlreadyRunning,

    #[error("not running")]
    NotRunning,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
