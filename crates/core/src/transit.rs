use serde::{Deserialize, Serialize};

use crate::ids::{PathId, RouterId, ShortHash};

/// State a relay keeps for each path that passes through it (§3). The forwarding logic that
/// mutates this lives in `lokinet-relay`; this crate only owns the shared shape so that
/// `lokinet-path` (which builds the LRCM) and `lokinet-relay` (which installs and forwards
/// through it) agree on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitHop {
    pub prev_hop: RouterId,
    pub ingress_path_id: PathId,
    pub next_hop: RouterId,
    pub egress_path_id: PathId,
    pub session_key: ShortHash,
    pub upstream_bytes: u64,
    pub downstream_bytes: u64,
    pub expires_at: u64,
}

impl TransitHop {
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Keys transit-hop lookup by `(prevHop, rxid)` per §4.5 step 3.
    pub fn ingress_key(&self) -> (RouterId, PathId) {
        (self.prev_hop, self.ingress_path_id)
    }
}
