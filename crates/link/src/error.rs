use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Core(#[from] lokinet_core::CoreError),

    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("session rejected: {0}")]
    Rejected(String),

    #[error("fragment for unknown session")]
    UnknownSession,

    #[error("protocol version mismatch: peer speaks {0}")]
    VersionMismatch(i64),
}

pub type Result<T> = std::result::Result<T, LinkError>;
