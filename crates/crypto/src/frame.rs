use rand::RngCore;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::dh::{dh_client, dh_server};
use crate::hash::keyed_mac32;
use crate::stream::xchacha20;

/// `[32-byte MAC][32-byte nonce][32-byte ephemeral pub][ciphertext]` (§4.5).
///
/// The sender generates a fresh ephemeral X25519 keypair per frame, derives the shared secret
/// via `dh_client` (sender plays the client role), XChaCha20-encrypts the plaintext, and MACs
/// the `(nonce || ephemeral_pub || ciphertext)` tail with a key also drawn from the shared
/// secret. The recipient recomputes the same secret via `dh_server`.
pub struct EncryptedFrame(pub Vec<u8>);

const MAC_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const EPHEMERAL_PUB_LEN: usize = 32;
const HEADER_LEN: usize = MAC_LEN + NONCE_LEN + EPHEMERAL_PUB_LEN;

fn derive_mac_and_stream_keys(shared: &[u8; 32]) -> ([u8; 32], [u8; 32]) {
    // Two independent keys from one shared secret via domain-separated BLAKE2b-32.
    let mac_key = crate::hash::shorthash(&[shared.as_slice(), b"mac"].concat());
    let stream_key = crate::hash::shorthash(&[shared.as_slice(), b"stream"].concat());
    (mac_key, stream_key)
}

impl EncryptedFrame {
    /// Encrypt `plaintext` to `recipient_enc_pub` using a fresh ephemeral keypair.
    pub fn encrypt(plaintext: &[u8], recipient_enc_pub: &[u8; 32]) -> Self {
        let mut rng = rand::thread_rng();
        let ephemeral_secret = StaticSecret::random_from_rng(&mut rng);
        let ephemeral_pub = X25519PublicKey::from(&ephemeral_secret).to_bytes();

        let mut nonce = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut nonce);

        let shared = dh_client(recipient_enc_pub, ephemeral_secret.as_bytes(), &nonce);
        let (mac_key, stream_key) = derive_mac_and_stream_keys(&shared);

        let mut ciphertext = plaintext.to_vec();
        xchacha20(&mut ciphertext, &stream_key, &nonce);

        let mut tail = Vec::with_capacity(NONCE_LEN + EPHEMERAL_PUB_LEN + ciphertext.len());
        tail.extend_from_slice(&nonce);
        tail.extend_from_slice(&ephemeral_pub);
        tail.extend_from_slice(&ciphertext);
        let mac = keyed_mac32(&mac_key, &tail);

        let mut out = Vec::with_capacity(MAC_LEN + tail.len());
        out.extend_from_slice(&mac);
        out.extend_from_slice(&tail);
        Self(out)
    }

    /// Decrypt a frame addressed to us; `our_enc_sec` is our encryption secret key. Returns
    /// `None` on MAC failure or truncated input (caller maps this to `CoreError::AuthFailure`).
    pub fn decrypt(&self, our_enc_sec: &[u8; 32]) -> Option<Vec<u8>> {
        if self.0.len() < HEADER_LEN {
            return None;
        }
        let mac = &self.0[0..MAC_LEN];
        let nonce: [u8; NONCE_LEN] = self.0[MAC_LEN..MAC_LEN + NONCE_LEN].try_into().ok()?;
        let ephemeral_pub: [u8; EPHEMERAL_PUB_LEN] =
            self.0[MAC_LEN + NONCE_LEN..HEADER_LEN].try_into().ok()?;
        let ciphertext = &self.0[HEADER_LEN..];

        let shared = dh_server(&ephemeral_pub, our_enc_sec, &nonce);
        let (mac_key, stream_key) = derive_mac_and_stream_keys(&shared);

        let expected_mac = keyed_mac32(&mac_key, &self.0[MAC_LEN..]);
        if !constant_time_eq(&expected_mac, mac) {
            return None;
        }

        let mut plaintext = ciphertext.to_vec();
        xchacha20(&mut plaintext, &stream_key, &nonce);
        Some(plaintext)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
