use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};
use lokinet_core::{IntroSet, RouterContact, SigBytes};

use crate::keys::SigningKeypair;

/// Sign arbitrary data with a signing keypair.
pub fn sign_data(keypair: &SigningKeypair, data: &[u8]) -> [u8; 64] {
    let signature: Signature = keypair.signing_key.sign(data);
    signature.to_bytes()
}

/// Verify a raw Ed25519 signature.
pub fn verify_signature(pubkey: &[u8; 32], data: &[u8], signature: &[u8; 64]) -> bool {
    let verifying_key = match VerifyingKey::from_bytes(pubkey) {
        Ok(vk) => vk,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(signature);
    verifying_key.verify(data, &signature).is_ok()
}

/// Sign a RouterContact: fills in `signature` over `signable_bytes()`.
pub fn sign_rc(keypair: &SigningKeypair, rc: &mut RouterContact) {
    let data = rc.signable_bytes();
    rc.signature = SigBytes(sign_data(keypair, &data));
}

/// Verify §3's signature-validity clause for a RouterContact (the other two clauses — expiry
/// and netid — are `RouterContact::check_fresh`, which needs no crypto).
pub fn verify_rc(rc: &RouterContact) -> bool {
    verify_signature(&rc.signing_key, &rc.signable_bytes(), &rc.signature.0)
}

/// Verify an IntroSet's signature over its Z-zeroed encoding. `signable_bytes` is produced by
/// `lokinet_wire`'s bencode helper (this crate depends only on `lokinet-core`, not `lokinet-wire`,
/// so callers pass the already-canonicalized bytes).
pub fn verify_introset_signature(introset: &IntroSet, signable_bytes: &[u8]) -> bool {
    verify_signature(&introset.service_info.sign_key, signable_bytes, &introset.signature.0)
}

/// Sign an IntroSet's Z-zeroed encoding with the service identity's signing key, the counterpart
/// to `verify_introset_signature`. `signable_bytes` is the same caller-supplied, already-zeroed
/// encoding the verifier re-derives and checks against.
pub fn sign_introset(keypair: &SigningKeypair, signable_bytes: &[u8]) -> SigBytes {
    SigBytes(sign_data(keypair, signable_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trips() {
        let keypair = SigningKeypair::generate();
        let data = b"a routing layer message";
        let signature = sign_data(&keypair, data);
        assert!(verify_signature(&keypair.public_key_bytes(), data, &signature));
    }

    #[test]
    fn verify_rejects_tampered_data() {
        let keypair = SigningKeypair::generate();
        let signature = sign_data(&keypair, b"original");
        assert!(!verify_signature(&keypair.public_key_bytes(), b"tampered", &signature));
    }

    #[test]
    fn verify_rejects_wrong_pubkey() {
        let a = SigningKeypair::generate();
        let b = SigningKeypair::generate();
        let signature = sign_data(&a, b"data");
        assert!(!verify_signature(&b.public_key_bytes(), b"data", &signature));
    }

    #[test]
    fn sign_introset_round_trips_with_verify() {
        use lokinet_core::{Introduction, PathId, ServiceInfo};

        let keypair = SigningKeypair::generate();
        let mut introset = IntroSet {
            service_info: ServiceInfo {
                enc_key: [1u8; 32],
                sign_key: keypair.public_key_bytes(),
                vanity: [0u8; 16],
                version: 0,
            },
            introductions: vec![Introduction { router: [2u8; 32], path_id: PathId([3u8; 16]), expires_at: 600, latency_ms: 50 }],
            pq_pubkey: [4u8; 32],
            topic: None,
            timestamp: 100,
            pow: None,
            signature: SigBytes::zero(),
        };
        let encoded = b"a stand-in for the bencoded, Z-zeroed introset";
        introset.signature = sign_introset(&keypair, encoded);
        assert!(verify_introset_signature(&introset, encoded));
    }

    #[test]
    fn sign_rc_produces_a_verifiable_contact() {
        use std::net::{IpAddr, Ipv4Addr};
        let keypair = SigningKeypair::generate();
        let mut rc = RouterContact {
            router_id: keypair.public_key_bytes(),
            signing_key: keypair.public_key_bytes(),
            encryption_key: [9u8; 32],
            addresses: vec![lokinet_core::AddressInfo {
                rank: 0,
                dialect: "udp".into(),
                pubkey: [1u8; 32],
                ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 1090,
            }],
            netid: "lokinet".into(),
            last_updated: 1000,
            signature: SigBytes::zero(),
        };
        sign_rc(&keypair, &mut rc);
        assert!(verify_rc(&rc));

        rc.last_updated += 1;
        assert!(!verify_rc(&rc), "mutating a signed field must invalidate the signature");
    }
}
