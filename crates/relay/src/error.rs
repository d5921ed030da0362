use lokinet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("unknown transit hop for this (prevHop, rxid) pair")]
    UnknownTransitHop,

    #[error("transit hop expired")]
    Expired,

    #[error("commit record rejected: {0}")]
    CommitRejected(String),

    #[error("replayed nonce on an established transit hop")]
    Replayed,
}

pub type Result<T> = std::result::Result<T, RelayError>;
