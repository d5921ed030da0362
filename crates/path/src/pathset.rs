//! Per-client path scheduling (§4.5): maintains a target pool of paths, starts replacement
//! builds before a path's lifetime runs out, and retires expired ones.

use lokinet_core::{PathHop, PathId, PathStatus, DEFAULT_PATH_LIFETIME_SECS, PATH_REVOKE_MARGIN_SECS};

/// One locally-built path tracked by the scheduler.
pub struct PathEntry {
    pub hops: Vec<PathHop>,
    pub status: PathStatus,
    pub built_at_secs: u64,
    pub lifetime_secs: u64,
}

impl PathEntry {
    pub fn new(hops: Vec<PathHop>, built_at_secs: u64, lifetime_secs: u64) -> Self {
        Self { hops, status: PathStatus::Building, built_at_secs, lifetime_secs }
    }

    pub fn expires_at_secs(&self) -> u64 {
        self.built_at_secs + self.lifetime_secs
    }

    pub fn should_start_expiring(&self, now_secs: u64) -> bool {
        self.status == PathStatus::Established
            && now_secs + PATH_REVOKE_MARGIN_SECS >= self.expires_at_secs()
    }

    pub fn is_expired(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at_secs()
    }

    /// The txid of the path's first hop, used to route an LRCM reply back to this entry.
    pub fn client_facing_txid(&self) -> Option<PathId> {
        self.hops.first().map(|h| h.txid)
    }
}

/// Tracks the pool of paths for a client or hidden-service endpoint and decides when to build
/// replacements, independent of any particular transport.
pub struct PathSet {
    pub num_hops: usize,
    pub target_paths: usize,
    pub paths: Vec<PathEntry>,
}

impl PathSet {
    pub fn new(num_hops: usize, target_paths: usize) -> Self {
        Self { num_hops, target_paths, paths: Vec::new() }
    }

    /// How many additional paths should be started right now (including replacements for
    /// paths that just started expiring).
    pub fn builds_needed(&mut self, now_secs: u64) -> usize {
        for path in &mut self.paths {
            if path.should_start_expiring(now_secs) {
                path.status = PathStatus::Expiring;
            }
        }
        self.paths.retain_mut(|p| {
            if p.is_expired(now_secs) {
                p.status = PathStatus::Expired;
                false
            } else {
                true
            }
        });

        let live = self
            .paths
            .iter()
            .filter(|p| matches!(p.status, PathStatus::Building | PathStatus::Established))
            .count();
        self.target_paths.saturating_sub(live)
    }

    pub fn mark_established(&mut self, client_facing_txid: PathId) {
        if let Some(path) = self
            .paths
            .iter_mut()
            .find(|p| p.client_facing_txid() == Some(client_facing_txid))
        {
            path.status = PathStatus::Established;
        }
    }

    pub fn established_count(&self) -> usize {
        self.paths.iter().filter(|p| p.status == PathStatus::Established).count()
    }
}

impl Default for PathSet {
    fn default() -> Self {
        Self::new(4, 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hop(id: u8) -> PathHop {
        PathHop {
            router: [id; 32],
            session_key: [id; 32],
            txid: PathId::random(),
            rxid: PathId::random(),
        }
    }

    #[test]
    fn fresh_path_set_needs_target_paths() {
        let mut set = PathSet::new(4, 6);
        assert_eq!(set.builds_needed(0), 6);
    }

    #[test]
    fn established_paths_reduce_builds_needed() {
        let mut set = PathSet::new(4, 2);
        let entry = PathEntry::new(vec![make_hop(1)], 0, DEFAULT_PATH_LIFETIME_SECS);
        let txid = entry.client_facing_txid().unwrap();
        set.paths.push(entry);
        set.mark_established(txid);
        assert_eq!(set.builds_needed(100), 1);
    }

    #[test]
    fn near_expiry_path_transitions_to_expiring_and_is_replaced() {
        let mut set = PathSet::new(4, 1);
        let entry = PathEntry::new(vec![make_hop(1)], 0, DEFAULT_PATH_LIFETIME_SECS);
        let txid = entry.client_facing_txid().unwrap();
        set.paths.push(entry);
        set.mark_established(txid);

        let near_expiry = DEFAULT_PATH_LIFETIME_SECS - PATH_REVOKE_MARGIN_SECS + 1;
        let needed = set.builds_needed(near_expiry);
        assert_eq!(needed, 1);
        assert_eq!(set.paths[0].status, PathStatus::Expiring);
    }

    #[test]
    fn fully_expired_path_is_dropped() {
        let mut set = PathSet::new(4, 1);
        set.paths.push(PathEntry::new(vec![make_hop(1)], 0, DEFAULT_PATH_LIFETIME_SECS));
        set.builds_needed(DEFAULT_PATH_LIFETIME_SECS + 1);
        assert!(set.paths.is_empty());
    }
}
