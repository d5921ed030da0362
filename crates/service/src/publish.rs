//! IntroSet publish lifecycle (§4.8): as paths come up, pick the best `num_intros` to advertise
//! as inbound introductions, sign the resulting IntroSet with our identity key, and rotate the
//! DHT storage key each publish window so a DHT-watching observer can't trivially correlate
//! successive publishes to the same service.

use std::collections::BTreeMap;

use lokinet_core::{IntroSet, Introduction, PathStatus, RouterId};
use lokinet_crypto::{derive_subkey, rotation_window_label, sign_introset};
use lokinet_path::PathSet;
use lokinet_wire::{signable_bytes, BenValue};

use crate::identity::ServiceIdentity;

const SIG_KEY: &[u8] = b"Z";

/// Rough per-hop latency estimate used to rank introductions when no measured RTT is available
/// (path building here doesn't track wall-clock round trip time yet).
const ESTIMATED_HOP_LATENCY_MS: u32 = 50;

/// Default count of introductions to advertise per publish (§4.8).
pub const DEFAULT_NUM_INTROS: u8 = 4;

/// Pick up to `num_intros` established, unexpired paths from `path_set` and turn each into an
/// `Introduction` pointing at that path's entry hop. Shorter paths are preferred as a latency
/// proxy in the absence of a real RTT sample; ties keep `path_set`'s existing order.
pub fn select_introductions(path_set: &PathSet, now: u64, num_intros: u8) -> Vec<Introduction> {
    let mut candidates: Vec<_> = path_set
        .paths
        .iter()
        .filter(|p| p.status == PathStatus::Established && !p.is_expired(now))
        .collect();
    candidates.sort_by_key(|p| p.hops.len());

    candidates
        .into_iter()
        .take(num_intros as usize)
        .filter_map(|path| {
            let entry_hop = path.hops.first()?;
            Some(Introduction {
                router: entry_hop.router,
                path_id: entry_hop.txid,
                expires_at: path.expires_at_secs(),
                latency_ms: ESTIMATED_HOP_LATENCY_MS * path.hops.len() as u32,
            })
        })
        .collect()
}

fn introduction_value(intro: &Introduction) -> BenValue {
    let mut d = BTreeMap::new();
    d.insert(b"r".to_vec(), BenValue::Bytes(intro.router.to_vec()));
    d.insert(b"p".to_vec(), BenValue::Bytes(intro.path_id.0.to_vec()));
    d.insert(b"x".to_vec(), BenValue::Int(intro.expires_at as i64));
    d.insert(b"l".to_vec(), BenValue::Int(intro.latency_ms as i64));
    BenValue::Dict(d)
}

/// Canonical bencode dict for an `IntroSet`: the same shape signed and verified over, with the
/// signature zeroed by the caller via [`lokinet_wire::signable_bytes`] before hashing.
fn introset_dict(introset: &IntroSet) -> BTreeMap<Vec<u8>, BenValue> {
    let mut d = BTreeMap::new();
    d.insert(b"e".to_vec(), BenValue::Bytes(introset.service_info.enc_key.to_vec()));
    d.insert(b"s".to_vec(), BenValue::Bytes(introset.service_info.sign_key.to_vec()));
    d.insert(b"v".to_vec(), BenValue::Bytes(introset.service_info.vanity.to_vec()));
    d.insert(b"n".to_vec(), BenValue::Int(introset.service_info.version as i64));
    d.insert(b"i".to_vec(), BenValue::List(introset.introductions.iter().map(introduction_value).collect()));
    d.insert(b"k".to_vec(), BenValue::Bytes(introset.pq_pubkey.to_vec()));
    d.insert(b"t".to_vec(), BenValue::Bytes(introset.topic.map(|t| t.0.to_vec()).unwrap_or_default()));
    d.insert(b"w".to_vec(), BenValue::Int(introset.timestamp as i64));
    d.insert(b"Z".to_vec(), BenValue::Bytes(introset.signature.0.to_vec()));
    d
}

/// The bytes an IntroSet's signature is computed and verified over: its canonical dict with `Z`
/// zeroed.
pub fn introset_signable_bytes(introset: &IntroSet) -> Vec<u8> {
    signable_bytes(&introset_dict(introset), SIG_KEY, 64)
}

/// Build and sign a fresh IntroSet from `introductions`, ready to publish.
pub fn build_introset(identity: &ServiceIdentity, introductions: Vec<Introduction>, pq_pubkey: [u8; 32], now: u64) -> IntroSet {
    let mut introset = IntroSet {
        service_info: identity.service_info(),
        introductions,
        pq_pubkey,
        topic: None,
        timestamp: now,
        pow: None,
        signature: lokinet_core::SigBytes::zero(),
    };
    let signable = introset_signable_bytes(&introset);
    introset.signature = sign_introset(&identity.signing, &signable);
    introset
}

/// The key this publish window's IntroSet should be stored under in the DHT: a subkey derived
/// from the service's signing key and the current republish window, so the storage key rotates
/// each window even though the address everyone resolves (`ServiceIdentity::address`) stays
/// fixed.
pub fn publish_storage_key(identity: &ServiceIdentity, now: u64, republish_interval_secs: u64) -> RouterId {
    let window = rotation_window_label(now, republish_interval_secs);
    derive_subkey(&identity.signing, &window).public_key_bytes()
}

/// Whether a publish window has elapsed since `last_published_at` and a fresh IntroSet is due.
pub fn republish_due(last_published_at: u64, now: u64, republish_interval_secs: u64) -> bool {
    now.saturating_sub(last_published_at) >= republish_interval_secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use lokinet_core::{PathHop, PathId};
    use lokinet_path::PathEntry;

    fn make_hop(id: u8) -> PathHop {
        PathHop { router: [id; 32], session_key: [id; 32], txid: PathId::random(), rxid: PathId::random() }
    }

    fn established_path(id: u8, hops: usize) -> PathEntry {
        let mut entry = PathEntry::new((0..hops).map(|i| make_hop(id + i as u8)).collect(), 0, 600);
        entry.status = PathStatus::Established;
        entry
    }

    #[test]
    fn select_introductions_prefers_shorter_established_paths() {
        let mut set = PathSet::new(3, 4);
        set.paths.push(established_path(1, 3));
        set.paths.push(established_path(10, 2));
        set.paths.push(PathEntry::new(vec![make_hop(20)], 0, 600)); // still Building, excluded

        let picked = select_introductions(&set, 0, 1);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].router, [10u8; 32]);
    }

    #[test]
    fn select_introductions_caps_at_num_intros() {
        let mut set = PathSet::new(3, 5);
        for i in 0..5u8 {
            set.paths.push(established_path(i * 10 + 1, 3));
        }
        assert_eq!(select_introductions(&set, 0, 4).len(), 4);
    }

    #[test]
    fn expired_established_paths_are_excluded() {
        let mut set = PathSet::new(3, 1);
        let mut path = established_path(1, 3);
        path.built_at_secs = 0;
        path.lifetime_secs = 100;
        set.paths.push(path);
        assert!(select_introductions(&set, 200, 4).is_empty());
    }

    #[test]
    fn build_introset_produces_a_verifiable_signature() {
        let identity = ServiceIdentity::generate();
        let intro = Introduction { router: [9u8; 32], path_id: PathId::random(), expires_at: 600, latency_ms: 50 };
        let introset = build_introset(&identity, vec![intro], [0u8; 32], 100);

        let signable = introset_signable_bytes(&introset);
        assert!(lokinet_crypto::verify_introset_signature(&introset, &signable));
    }

    #[test]
    fn tampering_with_an_introduction_invalidates_the_signature() {
        let identity = ServiceIdentity::generate();
        let intro = Introduction { router: [9u8; 32], path_id: PathId::random(), expires_at: 600, latency_ms: 50 };
        let mut introset = build_introset(&identity, vec![intro], [0u8; 32], 100);
        let original_signable = introset_signable_bytes(&introset);
        assert!(lokinet_crypto::verify_introset_signature(&introset, &original_signable));

        introset.introductions[0].latency_ms = 999;
        let tampered_signable = introset_signable_bytes(&introset);
        assert!(!lokinet_crypto::verify_introset_signature(&introset, &tampered_signable));
    }

    #[test]
    fn publish_storage_key_rotates_across_windows_but_not_within_one() {
        let identity = ServiceIdentity::generate();
        let a = publish_storage_key(&identity, 1_000, 300);
        let b = publish_storage_key(&identity, 1_299, 300);
        let c = publish_storage_key(&identity, 1_300, 300);
        assert_eq!(a, b, "same window must yield the same storage key");
        assert_ne!(a, c, "crossing a window boundary must rotate the storage key");
    }

    #[test]
    fn republish_due_respects_the_interval() {
        assert!(!republish_due(0, 100, 300));
        assert!(republish_due(0, 300, 300));
        assert!(republish_due(0, 500, 300));
    }
}
