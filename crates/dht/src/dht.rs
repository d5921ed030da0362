use lokinet_core::{IntroSet, RouterContact, RouterId};

use crate::bucket::{KBucket, DEFAULT_FANOUT};
use crate::transaction::TransactionTable;

/// Default replication factor for `PublishIntro` (§4.7).
pub const DEFAULT_PUBLISH_FANOUT: u8 = 4;
/// Freshness skew an incoming introset must beat to replace a stored one (§4.7).
pub const FRESHNESS_SKEW_SECS: u64 = 10;

/// Local DHT state: the two Kademlia-like buckets plus the pending transaction table (§4.7).
pub struct Dht {
    local_key: RouterId,
    pub rc_nodes: KBucket<RouterContact>,
    pub introset_nodes: KBucket<IntroSet>,
    pub transactions: TransactionTable,
}

impl Dht {
    pub fn new(local_key: RouterId) -> Self {
        Self {
            local_key,
            rc_nodes: KBucket::new(local_key, DEFAULT_FANOUT),
            introset_nodes: KBucket::new(local_key, DEFAULT_FANOUT),
            transactions: TransactionTable::new(),
        }
    }

    /// Insert or replace a stored introset at `key` iff it is fresher than whatever is already
    /// there, per the §4.7 freshness policy. Returns whether the store took effect.
    pub fn try_store_introset(&mut self, key: RouterId, introset: IntroSet) -> bool {
        match self.introset_nodes.get(&key) {
            Some(existing) if introset.timestamp <= existing.timestamp + FRESHNESS_SKEW_SECS => false,
            _ => {
                self.introset_nodes.insert(key, introset);
                true
            }
        }
    }

    /// Drop expired stored introsets on a maintenance tick (§4.7).
    pub fn expire_introsets(&mut self, now: u64, path_lifetime_secs: u64) {
        self.introset_nodes.retain(|introset| {
            introset.check_structure(now, path_lifetime_secs, introset.timestamp as usize).is_ok()
                || introset.introductions.iter().any(|i| !i.is_expired(now))
        });
    }

    /// The `n` router contacts whose keys are closest to `target` (FindRouter's iterative form).
    pub fn closest_routers(&self, target: &RouterId, n: usize) -> Vec<&RouterContact> {
        self.rc_nodes.closest(target, n)
    }

    /// Pick up to `n` peers to forward a `PublishIntro`/`FindIntro` to, excluding `already_asked`
    /// and our own key.
    pub fn forward_targets(&self, target: &RouterId, n: usize, already_asked: &[RouterId]) -> Vec<RouterId> {
        self.rc_nodes
            .closest(target, n + already_asked.len() + 1)
            .into_iter()
            .map(|rc| rc.router_id)
            .filter(|id| *id != self.local_key && !already_asked.contains(id))
            .take(n)
            .collect()
    }
}

/// Whether a `FindIntro`/`PublishIntro` forward should stop at this hop: true once the
/// hop-count budget is exhausted (§4.7: "hop 0 returns local result").
pub fn is_terminal_hop(remaining_hops: u8) -> bool {
    remaining_hops == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use lokinet_core::{ServiceInfo};

    fn sample_introset(timestamp: u64) -> IntroSet {
        IntroSet {
            service_info: ServiceInfo { enc_key: [1u8; 32], sign_key: [2u8; 32], vanity: [0u8; 16], version: 0 },
            introductions: vec![lokinet_core::Introduction {
                router: [3u8; 32],
                path_id: lokinet_core::PathId([0u8; 16]),
                expires_at: timestamp + 600,
                latency_ms: 10,
            }],
            pq_pubkey: [0u8; 32],
            topic: None,
            timestamp,
            pow: None,
            signature: lokinet_core::SigBytes::zero(),
        }
    }

    #[test]
    fn store_rejects_non_fresher_introset() {
        let mut dht = Dht::new([0u8; 32]);
        let key = [9u8; 32];
        assert!(dht.try_store_introset(key, sample_introset(100)));
        assert!(!dht.try_store_introset(key, sample_introset(105)), "within skew, should not replace");
        assert!(dht.try_store_introset(key, sample_introset(200)), "past skew, should replace");
    }

    #[test]
    fn forward_targets_excludes_self_and_already_asked() {
        let local = [0u8; 32];
        let mut dht = Dht::new(local);
        let mut other = [1u8; 32];
        other[0] = 0x10;
        dht.rc_nodes.insert(
            other,
            RouterContact {
                router_id: other,
                signing_key: [0u8; 32],
                encryption_key: [0u8; 32],
                addresses: vec![],
                netid: "lokinet".into(),
                last_updated: 0,
                signature: lokinet_core::SigBytes::zero(),
            },
        );
        dht.rc_nodes.insert(
            local,
            RouterContact {
                router_id: local,
                signing_key: [0u8; 32],
                encryption_key: [0u8; 32],
                addresses: vec![],
                netid: "lokinet".into(),
                last_updated: 0,
                signature: lokinet_core::SigBytes::zero(),
            },
        );
        let targets = dht.forward_targets(&[2u8; 32], 5, &[]);
        assert!(targets.contains(&other));
        assert!(!targets.contains(&local));
    }

    #[test]
    fn terminal_hop_is_exactly_zero() {
        assert!(is_terminal_hop(0));
        assert!(!is_terminal_hop(1));
    }
}
