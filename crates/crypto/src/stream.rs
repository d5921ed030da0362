use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::XChaCha20;

/// In-place XChaCha20 stream xor (§4.1). No authentication tag — callers that need integrity
/// pair this with `hash::keyed_mac32` over the ciphertext, matching the original's
/// `crypto_stream_xchacha20_xor` + separate keyed hash rather than an AEAD construction.
pub fn xchacha20(buf: &mut [u8], key: &[u8; 32], nonce: &[u8; 24]) {
    let mut cipher = XChaCha20::new(key.into(), nonce.into());
    cipher.apply_keystream(buf);
}
