//! Accepting an `LR_CommitMessage` layer addressed to this relay (§4.5 step 2-3): decrypt our
//! `EncryptedFrame`, re-derive the session key via `dh_server`, and install a `TransitHop`.

use lokinet_core::{PathId, RouterId, TransitHop};
use lokinet_crypto::{dh_server, EncryptedFrame};
use lokinet_wire::BenValue;

use crate::error::{RelayError, Result};

/// Default transit-hop lifetime, matching the client's `DEFAULT_PATH_LIFETIME_SECS` — a relay
/// has no independent opinion on how long to hold a hop open; it honors what the client asked for.
const DEFAULT_HOP_LIFETIME_SECS: u64 = 10 * 60;

/// Decrypt and validate a commit record addressed to us, returning the `TransitHop` to install.
/// `prev_hop` is the RouterID the frame arrived from (unauthenticated at this layer — the link
/// session it arrived over is what authenticates the peer).
pub fn accept_commit(
    frame: &EncryptedFrame,
    our_enc_sec: &[u8; 32],
    prev_hop: RouterId,
    now: u64,
) -> Result<TransitHop> {
    let plaintext = frame
        .decrypt(our_enc_sec)
        .ok_or_else(|| RelayError::CommitRejected("frame did not decrypt".into()))?;

    let value = BenValue::decode(&plaintext)
        .map_err(|e| RelayError::CommitRejected(format!("malformed commit record: {e}")))?;
    let dict = value
        .as_dict()
        .ok_or_else(|| RelayError::CommitRejected("commit record is not a dict".into()))?;

    let txid = read_path_id(dict, b"T")?;
    let rxid = read_path_id(dict, b"R")?;
    let next_hop: RouterId = read_fixed(dict, b"N")?;
    let ephemeral_pub: [u8; 32] = read_fixed(dict, b"K")?;
    let key_nonce: [u8; 24] = read_fixed(dict, b"X")?;
    let lifetime_secs = dict
        .get(b"L".as_slice())
        .and_then(|v| v.as_int())
        .map(|v| v.max(0) as u64)
        .unwrap_or(DEFAULT_HOP_LIFETIME_SECS);

    let session_key = dh_server(&ephemeral_pub, our_enc_sec, &key_nonce);

    Ok(TransitHop {
        prev_hop,
        ingress_path_id: txid,
        next_hop,
        egress_path_id: rxid,
        session_key,
        upstream_bytes: 0,
        downstream_bytes: 0,
        expires_at: now + lifetime_secs,
    })
}

fn read_fixed<const N: usize>(
    dict: &std::collections::BTreeMap<Vec<u8>, BenValue>,
    key: &[u8],
) -> Result<[u8; N]> {
    dict.get(key)
        .and_then(|v| v.as_bytes())
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| RelayError::CommitRejected(format!("missing/malformed field {key:?}")))
}

fn read_path_id(dict: &std::collections::BTreeMap<Vec<u8>, BenValue>, key: &[u8]) -> Result<PathId> {
    read_fixed::<16>(dict, key).map(PathId::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lokinet_crypto::{dh_client, EncryptionKeypair};
    use rand::RngCore;
    use std::collections::BTreeMap;
    use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

    fn build_test_commit(
        recipient: &EncryptionKeypair,
        next_hop: RouterId,
        txid: PathId,
        rxid: PathId,
    ) -> (EncryptedFrame, [u8; 32]) {
        let mut rng = rand::thread_rng();
        let ephemeral_secret = StaticSecret::random_from_rng(&mut rng);
        let ephemeral_pub = X25519PublicKey::from(&ephemeral_secret).to_bytes();
        let mut key_nonce = [0u8; 24];
        rng.fill_bytes(&mut key_nonce);

        let our_sec_bytes = ephemeral_secret.to_bytes();
        let session_key = dh_client(&recipient.public_key_bytes(), &our_sec_bytes, &key_nonce);

        let mut dict = BTreeMap::new();
        dict.insert(b"T".to_vec(), BenValue::Bytes(txid.as_bytes().to_vec()));
        dict.insert(b"R".to_vec(), BenValue::Bytes(rxid.as_bytes().to_vec()));
        dict.insert(b"N".to_vec(), BenValue::Bytes(next_hop.to_vec()));
        dict.insert(b"K".to_vec(), BenValue::Bytes(ephemeral_pub.to_vec()));
        dict.insert(b"X".to_vec(), BenValue::Bytes(key_nonce.to_vec()));
        dict.insert(b"L".to_vec(), BenValue::Int(600));
        let record = BenValue::Dict(dict).encode();

        let frame = EncryptedFrame::encrypt(&record, &recipient.public_key_bytes());
        (frame, session_key)
    }

    #[test]
    fn accept_commit_installs_matching_session_key() {
        let recipient = EncryptionKeypair::generate();
        let txid = PathId::random();
        let rxid = PathId::random();
        let (frame, expected_session_key) =
            build_test_commit(&recipient, [9u8; 32], txid, rxid);

        let hop = accept_commit(&frame, &recipient.secret_key_bytes(), [7u8; 32], 0).unwrap();
        assert_eq!(hop.session_key, expected_session_key);
        assert_eq!(hop.prev_hop, [7u8; 32]);
        assert_eq!(hop.next_hop, [9u8; 32]);
        assert_eq!(hop.ingress_path_id, txid);
        assert_eq!(hop.egress_path_id, rxid);
        assert_eq!(hop.expires_at, 600);
    }

    #[test]
    fn rejects_frame_encrypted_for_someone_else() {
        let recipient = EncryptionKeypair::generate();
        let impostor = EncryptionKeypair::generate();
        let (frame, _) = build_test_commit(&recipient, [9u8; 32], PathId::random(), PathId::random());
        let result = accept_commit(&frame, &impostor.secret_key_bytes(), [7u8; 32], 0);
        assert!(result.is_err());
    }
}
