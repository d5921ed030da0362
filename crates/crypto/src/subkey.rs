use crate::hash::hash;
use crate::keys::SigningKeypair;

/// Derive the per-publish subkey used to sign an IntroSet under DHT key rotation (§4.7), or the
/// path-endpoint-derived subkey an endpoint signs inbound introductions with (§4.8).
///
/// Deterministic from the base signing key's seed and a rotation window label, so the same
/// `(seed, window)` pair always yields the same subkey and a verifier who is told the window can
/// recompute which subkey should have been used. This is a hash-derived subkey rather than the
/// original's discrete-log-blinded scalar scheme; it gives the same "fresh key per window"
/// externally-observable property without requiring direct curve scalar arithmetic.
pub fn derive_subkey(base: &SigningKeypair, window_label: &[u8]) -> SigningKeypair {
    let mut input = Vec::with_capacity(32 + window_label.len());
    input.extend_from_slice(&base.secret_key_bytes());
    input.extend_from_slice(window_label);
    let digest = hash(&input);
    let seed: [u8; 32] = digest[..32].try_into().expect("hash output is at least 32 bytes");
    SigningKeypair::from_secret_bytes(&seed)
}

/// Window label for a given unix timestamp, bucketed to the introset republish interval
/// (§4.8: ~5 minutes) so a subkey stays stable within one publish window.
pub fn rotation_window_label(unix_secs: u64, window_secs: u64) -> [u8; 8] {
    (unix_secs / window_secs.max(1)).to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_window_produces_same_subkey() {
        let base = SigningKeypair::generate();
        let window = rotation_window_label(1_000_000, 300);
        let a = derive_subkey(&base, &window);
        let b = derive_subkey(&base, &window);
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn different_window_produces_different_subkey() {
        let base = SigningKeypair::generate();
        let w1 = rotation_window_label(1_000_000, 300);
        let w2 = rotation_window_label(1_000_300, 300);
        let a = derive_subkey(&base, &w1);
        let b = derive_subkey(&base, &w2);
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn different_base_keys_produce_different_subkeys_for_same_window() {
        let base1 = SigningKeypair::generate();
        let base2 = SigningKeypair::generate();
        let window = rotation_window_label(42, 300);
        assert_ne!(
            derive_subkey(&base1, &window).public_key_bytes(),
            derive_subkey(&base2, &window).public_key_bytes()
        );
    }

    #[test]
    fn rotation_window_label_buckets_by_interval() {
        assert_eq!(rotation_window_label(0, 300), rotation_window_label(299, 300));
        assert_ne!(rotation_window_label(0, 300), rotation_window_label(300, 300));
    }
}
