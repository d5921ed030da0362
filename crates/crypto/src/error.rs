use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("authentication failure: {0}")]
    AuthFailure(String),

    #[error("post-quantum KEM decapsulation failed")]
    PqeDecapsulationFailed,

    #[error("invalid key encoding")]
    InvalidKeyEncoding,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
