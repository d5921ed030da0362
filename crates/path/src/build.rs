//! LR_CommitMessage construction (§4.5): one onion-wrapped commit record per hop, built and
//! sent together so the first hop can forward the remainder without seeing past its own layer.

use std::collections::BTreeMap;

use lokinet_core::{
    PathHop as CorePathHop, PathId, RouterContact, RouterId, DEFAULT_PATH_LIFETIME_SECS,
};
use lokinet_crypto::{dh_client, EncryptedFrame};
use lokinet_wire::BenValue;
use rand::RngCore;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

/// A path under construction: per-hop symmetric state plus the wire frames to send.
pub struct Commit {
    pub hops: Vec<CorePathHop>,
    pub frames: Vec<Vec<u8>>,
    pub lifetime_secs: u64,
}

/// Zero router ID marking "no further hop" in the final commit record.
const TERMINAL_HOP: RouterId = [0u8; 32];

fn commit_record_bytes(
    txid: PathId,
    rxid: PathId,
    next_hop: RouterId,
    ephemeral_pub: &[u8; 32],
    key_nonce: &[u8; 24],
    lifetime_secs: u64,
) -> Vec<u8> {
    let mut dict = BTreeMap::new();
    dict.insert(b"T".to_vec(), BenValue::Bytes(txid.as_bytes().to_vec()));
    dict.insert(b"R".to_vec(), BenValue::Bytes(rxid.as_bytes().to_vec()));
    dict.insert(b"N".to_vec(), BenValue::Bytes(next_hop.to_vec()));
    dict.insert(b"K".to_vec(), BenValue::Bytes(ephemeral_pub.to_vec()));
    dict.insert(b"X".to_vec(), BenValue::Bytes(key_nonce.to_vec()));
    dict.insert(b"L".to_vec(), BenValue::Int(lifetime_secs as i64));
    BenValue::Dict(dict).encode()
}

/// Build a commit for `hops` (in path order, client-facing first). Each hop's commit record is
/// encrypted under its `encryption_key` via [`EncryptedFrame`]; the per-hop session key is the
/// asymmetric DH secret the hop will re-derive via `dh_server` against `ephemeral_pub`/`key_nonce`.
pub fn build_commit(hops: &[RouterContact], lifetime_secs: u64) -> Commit {
    let mut rng = rand::thread_rng();
    let mut path_hops = Vec::with_capacity(hops.len());
    let mut frames = Vec::with_capacity(hops.len());

    for (i, hop) in hops.iter().enumerate() {
        let ephemeral_secret = StaticSecret::random_from_rng(&mut rng);
        let ephemeral_pub = X25519PublicKey::from(&ephemeral_secret).to_bytes();

        let mut key_nonce = [0u8; 24];
        rng.fill_bytes(&mut key_nonce);

        let our_sec_bytes = ephemeral_secret.to_bytes();
        let session_key = dh_client(&hop.encryption_key, &our_sec_bytes, &key_nonce);

        let txid = PathId::random();
        let rxid = PathId::random();
        let next_hop = hops.get(i + 1).map(|h| h.router_id).unwrap_or(TERMINAL_HOP);

        let record = commit_record_bytes(txid, rxid, next_hop, &ephemeral_pub, &key_nonce, lifetime_secs);
        frames.push(EncryptedFrame::encrypt(&record, &hop.encryption_key).0);

        path_hops.push(CorePathHop { router: hop.router_id, session_key, txid, rxid });
    }

    Commit { hops: path_hops, frames, lifetime_secs }
}
