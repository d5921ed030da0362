use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;

/// 32-byte router identifier; also used as the DHT key for a relay.
pub type RouterId = [u8; 32];

/// 32-byte Ed25519 or X25519 public key.
pub type PubKey = [u8; 32];

/// 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// 64-byte BLAKE2b hash.
pub type Hash = [u8; 64];

/// 32-byte keyed short hash (BLAKE2b-32 or BLAKE2s-32 output).
pub type ShortHash = [u8; 32];

/// 24-byte nonce used by XChaCha20 and the onion envelope.
pub type TunnelNonce = [u8; 24];

macro_rules! id128 {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 16]);

        impl $name {
            pub fn random() -> Self {
                let mut buf = [0u8; 16];
                rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut buf);
                Self(buf)
            }

            pub fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl From<[u8; 16]> for $name {
            fn from(value: [u8; 16]) -> Self {
                Self(value)
            }
        }
    };
}

id128!(
    PathId,
    "128-bit identifier for one (path, hop) pair; distinct for ingress and egress at each hop."
);
id128!(
    ConvoTag,
    "128-bit identifier binding an end-to-end hidden-service conversation."
);

/// Wrapper used where a fixed-size array needs `#[serde(with = "BigArray")]` support for a
/// signature field embedded in a larger struct.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct SigBytes(#[serde(with = "BigArray")] pub Signature);

impl SigBytes {
    pub const fn zero() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Debug for SigBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigBytes({})", hex::encode(self.0))
    }
}

impl PartialEq for SigBytes {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}
impl Eq for SigBytes {}
