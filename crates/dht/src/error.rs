use thiserror::Error;

#[derive(Debug, Error)]
pub enum DhtError {
    #[error(transparent)]
    Core(#[from] lokinet_core::CoreError),

    #[error("duplicate transaction id from {0:?}")]
    DuplicateTransaction(lokinet_core::RouterId),

    #[error("transaction not found")]
    UnknownTransaction,
}

pub type Result<T> = std::result::Result<T, DhtError>;
