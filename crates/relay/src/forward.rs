//! Steady-state transit forwarding: peel or add one symmetric layer per hop (§4.5 step 4-5). The
//! `RequestCache`-style bookkeeping lives in `table.rs`/`replay.rs`; this module only transforms
//! one packet given an already-installed `TransitHop`.

use lokinet_core::TransitHop;
use lokinet_crypto::xchacha20;

/// Peel one layer going toward the exit (client → relay → ... → exit). The relay doesn't learn
/// the plaintext; it only removes the layer it itself added knowledge of, so after this call the
/// buffer is what the *next* hop expects to decrypt again.
pub fn forward_upstream(hop: &mut TransitHop, nonce: &[u8; 24], payload: &mut [u8]) {
    xchacha20(payload, &hop.session_key, nonce);
    hop.upstream_bytes += payload.len() as u64;
}

/// Add one layer going back toward the client (exit → ... → relay → client). Symmetric with
/// `forward_upstream`: XChaCha20 stream xor is its own inverse under the same key/nonce, so the
/// client peels all layers added this way in reverse hop order.
pub fn forward_downstream(hop: &mut TransitHop, nonce: &[u8; 24], payload: &mut [u8]) {
    xchacha20(payload, &hop.session_key, nonce);
    hop.downstream_bytes += payload.len() as u64;
}
