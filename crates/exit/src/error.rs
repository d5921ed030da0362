use lokinet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExitError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("exit mode requires a configured DNS resolver")]
    ResolverNotConfigured,

    #[error("unknown exit session {0}")]
    UnknownSession(u64),

    #[error("exit session {0} already granted")]
    AlreadyGranted(u64),

    #[error("blocked destination: {0}")]
    BlockedDestination(String),

    #[error("rate limited")]
    RateLimited,
}

pub type Result<T> = std::result::Result<T, ExitError>;
