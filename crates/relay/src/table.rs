//! The transit-hop table a relay keeps for every path passing through it (§3, §4.5). TTL-keyed
//! map shape adapted from the request cache's evict-expired-then-evict-oldest pattern.

use std::collections::HashMap;

use lokinet_core::{PathId, RouterId, TransitHop};

/// Default cap on concurrently-installed transit hops for one relay; an arbitrary relay has
/// finite memory and must shed new commits once saturated rather than grow unbounded.
const DEFAULT_MAX_HOPS: usize = 10_000;

pub struct TransitHopTable {
    entries: HashMap<(RouterId, PathId), TransitHop>,
    max_hops: usize,
}

impl TransitHopTable {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), max_hops: DEFAULT_MAX_HOPS }
    }

    pub fn with_capacity(max_hops: usize) -> Self {
        Self { entries: HashMap::new(), max_hops }
    }

    /// Install a newly-accepted transit hop, evicting expired entries first if at capacity.
    /// Returns `false` (and does not install) if still full after eviction.
    pub fn install(&mut self, hop: TransitHop, now: u64) -> bool {
        if self.entries.len() >= self.max_hops {
            self.evict_expired(now);
        }
        if self.entries.len() >= self.max_hops {
            return false;
        }
        self.entries.insert(hop.ingress_key(), hop);
        true
    }

    pub fn get(&self, prev_hop: &RouterId, ingress_path_id: PathId) -> Option<&TransitHop> {
        self.entries.get(&(*prev_hop, ingress_path_id))
    }

    /// Look up by the egress-facing key, used to route a downstream reply back toward the client.
    pub fn get_by_egress(&self, next_hop: &RouterId, egress_path_id: PathId) -> Option<&TransitHop> {
        self.entries
            .values()
            .find(|h| &h.next_hop == next_hop && h.egress_path_id == egress_path_id)
    }

    pub fn remove(&mut self, prev_hop: &RouterId, ingress_path_id: PathId) -> Option<TransitHop> {
        self.entries.remove(&(*prev_hop, ingress_path_id))
    }

    pub fn evict_expired(&mut self, now: u64) {
        self.entries.retain(|_, hop| !hop.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransitHopTable {
    fn default() -> Self {
        Self::new()
    }
}
