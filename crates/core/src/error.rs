use thiserror::Error;

/// Error kinds shared by every crate that builds on `lokinet-core`'s data model.
///
/// Variant names mirror the error "Kinds" of the error-handling design rather than specific
/// call sites, so each crate boundary can wrap this with its own richer variants via `#[from]`
/// without losing the caller-visible category.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("authentication failure: {0}")]
    AuthFailure(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("router contact expired")]
    RcExpired,

    #[error("router contact netid mismatch: expected {expected}, got {got}")]
    NetidMismatch { expected: String, got: String },

    #[error("introset too large: {size} bytes (max {max})")]
    IntroSetTooLarge { size: usize, max: usize },

    #[error("introduction expired")]
    IntroductionExpired,

    #[error("unknown message type tag: {0:#x}")]
    UnknownTypeTag(u8),

    #[error("protocol version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u64, got: u64 },
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            CoreError::Malformed("bad length".into()).to_string(),
            "malformed message: bad length"
        );
        assert_eq!(CoreError::RcExpired.to_string(), "router contact expired");
        assert_eq!(
            CoreError::NetidMismatch { expected: "lokinet".into(), got: "testnet".into() }
                .to_string(),
            "router contact netid mismatch: expected lokinet, got testnet"
        );
        assert_eq!(
            CoreError::IntroSetTooLarge { size: 5000, max: 4096 }.to_string(),
            "introset too large: 5000 bytes (max 4096)"
        );
        assert_eq!(
            CoreError::UnknownTypeTag(0xff).to_string(),
            "unknown message type tag: 0xff"
        );
    }

    #[test]
    fn result_alias_propagates_with_question_mark() {
        fn inner() -> Result<u8> {
            Err(CoreError::IntroductionExpired)
        }
        fn outer() -> Result<u8> {
            let v = inner()?;
            Ok(v)
        }
        assert!(outer().is_err());
    }
}
