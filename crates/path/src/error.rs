use lokinet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("insufficient relays: need {need} but only {have} available")]
    InsufficientRelays { need: usize, have: usize },

    #[error("could not find a well-formed path through the candidate set after {0} attempts")]
    SelectionFailed(usize),

    #[error("commit rejected by hop {hop}: {reason}")]
    CommitRejected { hop: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, PathError>;
