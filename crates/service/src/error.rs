use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] lokinet_core::CoreError),

    #[error("invalid ONS name: {0}")]
    InvalidName(String),

    #[error("ONS record failed to decrypt")]
    OnsDecryptFailed,

    #[error("no live introduction available for this service")]
    NoLiveIntroduction,
}

pub type Result<T> = std::result::Result<T, ServiceError>;
