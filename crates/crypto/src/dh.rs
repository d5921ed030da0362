use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

/// X25519 ECDH followed by a BLAKE2b derivation that folds in both public keys in an order that
/// depends on the caller's role, so the resulting secret is asymmetric: a client and a server
/// performing the matched roles against each other's keys derive the same secret, but swapping
/// roles without swapping keys does not (§4.1, §8 "session key asymmetry").
fn dh_combine(shared: &[u8; 32], client_pub: &[u8; 32], server_pub: &[u8; 32], nonce: &[u8; 24]) -> [u8; 32] {
    let mut hasher = Blake2bVar::new(32).expect("32 is a valid blake2b output size");
    hasher.update(shared);
    hasher.update(client_pub);
    hasher.update(server_pub);
    hasher.update(nonce);
    let mut out = [0u8; 32];
    hasher.finalize_variable(&mut out).expect("fixed 32-byte output buffer");
    out
}

/// Derive a session secret acting as the client: `their_pub` is the server's public key.
pub fn dh_client(their_pub: &[u8; 32], our_sec: &[u8; 32], nonce: &[u8; 24]) -> [u8; 32] {
    let secret = StaticSecret::from(*our_sec);
    let our_pub = X25519PublicKey::from(&secret).to_bytes();
    let shared = secret.diffie_hellman(&X25519PublicKey::from(*their_pub));
    dh_combine(shared.as_bytes(), &our_pub, their_pub, nonce)
}

/// Derive a session secret acting as the server: `their_pub` is the client's public key.
pub fn dh_server(their_pub: &[u8; 32], our_sec: &[u8; 32], nonce: &[u8; 24]) -> [u8; 32] {
    let secret = StaticSecret::from(*our_sec);
    let our_pub = X25519PublicKey::from(&secret).to_bytes();
    let shared = secret.diffie_hellman(&X25519PublicKey::from(*their_pub));
    dh_combine(shared.as_bytes(), their_pub, &our_pub, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use x25519_dalek::StaticSecret;

    #[test]
    fn matched_roles_produce_the_same_secret() {
        let a_sec = [1u8; 32];
        let b_sec = [2u8; 32];
        let a_pub = X25519PublicKey::from(&StaticSecret::from(a_sec)).to_bytes();
        let b_pub = X25519PublicKey::from(&StaticSecret::from(b_sec)).to_bytes();
        let nonce = [7u8; 24];

        // A acts as client against B's pubkey; B acts as server against A's pubkey.
        let client_secret = dh_client(&b_pub, &a_sec, &nonce);
        let server_secret = dh_server(&a_pub, &b_sec, &nonce);
        assert_eq!(client_secret, server_secret);
    }

    #[test]
    fn mismatched_roles_do_not_match() {
        let a_sec = [1u8; 32];
        let b_sec = [2u8; 32];
        let b_pub = X25519PublicKey::from(&StaticSecret::from(b_sec)).to_bytes();
        let nonce = [7u8; 24];

        // Both sides compute as "client" against each other -- roles are not complementary.
        let a_as_client = dh_client(&b_pub, &a_sec, &nonce);
        let a_pub = X25519PublicKey::from(&StaticSecret::from(a_sec)).to_bytes();
        let b_as_client = dh_client(&a_pub, &b_sec, &nonce);
        assert_ne!(a_as_client, b_as_client);
    }

    #[test]
    fn different_nonce_changes_secret() {
        let a_sec = [1u8; 32];
        let b_sec = [2u8; 32];
        let b_pub = X25519PublicKey::from(&StaticSecret::from(b_sec)).to_bytes();
        let s1 = dh_client(&b_pub, &a_sec, &[0u8; 24]);
        let s2 = dh_client(&b_pub, &a_sec, &[1u8; 24]);
        assert_ne!(s1, s2);
    }
}
