//! Lokinet cryptographic primitives (§4.1).
//!
//! Ed25519 signing, X25519-derived asymmetric DH, raw XChaCha20 stream xor, BLAKE2b/BLAKE2s
//! hashing, the `EncryptedFrame` onion envelope, a post-quantum KEM wrapper, and hash-derived
//! subkeys for DHT-rotated introset signing.

mod dh;
mod error;
mod frame;
mod hash;
mod keys;
mod pqe;
mod sign;
mod stream;
mod subkey;

pub use dh::*;
pub use error::*;
pub use frame::*;
pub use hash::*;
pub use keys::*;
pub use pqe::*;
pub use sign::*;
pub use stream::*;
pub use subkey::*;
