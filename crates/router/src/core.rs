//! Router core (§4.9): owns the DHT node table, link sessions, transit-hop table, and per-mode
//! path/exit state, and computes what a tick should do. Socket I/O and actually dialing new
//! peers live one layer up (the daemon's event loop); this module only decides.

use std::collections::HashMap;
use std::net::SocketAddr;

use lokinet_core::RouterContact;
use lokinet_dht::Dht;
use lokinet_link::{LinkSession, SessionState};
use lokinet_path::PathSet;
use lokinet_relay::TransitHopTable;

/// Median gossip interval for our own RC to neighbors (§4.9: "≈30 min median").
pub const GOSSIP_INTERVAL_SECS: u64 = 30 * 60;

pub enum RouterMode {
    /// Client mode: builds outbound paths for its own traffic, no transit hops.
    Client { paths: PathSet },
    /// Relay mode: accepts transit hops from other routers' path builds.
    Relay { transit: TransitHopTable },
}

/// Per-tick summary of what the caller (the daemon event loop) should act on. The tick itself
/// never performs I/O; it only expires state and reports what work is outstanding.
#[derive(Debug, Clone, Default)]
pub struct TickActions {
    pub expired_sessions: Vec<SocketAddr>,
    pub expired_dht_transactions: usize,
    pub expired_transit_hops: usize,
    pub connections_needed: u32,
    pub path_builds_needed: usize,
    pub should_gossip_rc: bool,
}

pub struct RouterCore {
    pub local_rc: RouterContact,
    pub dht: Dht,
    pub sessions: HashMap<SocketAddr, LinkSession>,
    pub mode: RouterMode,
    pub min_connected_routers: u32,
    last_gossip_secs: u64,
}

impl RouterCore {
    pub fn new(local_rc: RouterContact, min_connected_routers: u32, mode: RouterMode) -> Self {
        let local_key = local_rc.router_id;
        RouterCore {
            local_rc,
            dht: Dht::new(local_key),
            sessions: HashMap::new(),
            mode,
            min_connected_routers,
            last_gossip_secs: 0,
        }
    }

    fn connected_count(&self) -> u32 {
        self.sessions.values().filter(|s| s.state == SessionState::Ready).count() as u32
    }

    /// Run one tick (§4.9, default interval 1s). Expires dead state in place and returns what
    /// outbound work the caller should perform.
    pub fn tick(&mut self, now: u64, path_lifetime_secs: u64) -> TickActions {
        let mut actions = TickActions::default();

        // 1. Expire link sessions, DHT transactions, and transit hops.
        let dead: Vec<SocketAddr> = self
            .sessions
            .iter()
            .filter(|(_, s)| now.saturating_sub(s.last_recv_secs) >= s.idle_timeout_secs)
            .map(|(addr, _)| *addr)
            .collect();
        for addr in &dead {
            self.sessions.remove(addr);
        }
        actions.expired_sessions = dead;

        actions.expired_dht_transactions = self.dht.transactions.expire(now).len();
        self.dht.expire_introsets(now, path_lifetime_secs);

        if let RouterMode::Relay { transit } = &mut self.mode {
            let before = transit.len();
            transit.evict_expired(now);
            actions.expired_transit_hops = before - transit.len();
        }

        // 2. Maintain outbound connections toward `min_connected_routers`.
        let connected = self.connected_count();
        actions.connections_needed = self.min_connected_routers.saturating_sub(connected);

        // 3. Trigger path builds (client mode only; relays don't build their own paths).
        if let RouterMode::Client { paths } = &mut self.mode {
            actions.path_builds_needed = paths.builds_needed(now);
        }

        // 4. Gossip our RC on a long jittered interval.
        if now.saturating_sub(self.last_gossip_secs) >= GOSSIP_INTERVAL_SECS {
            actions.should_gossip_rc = true;
            self.last_gossip_secs = now;
        }

        actions
    }

    /// Record that a fresh LinkIntro moved a session to Ready, for `connected_count` purposes.
    pub fn note_session(&mut self, addr: SocketAddr, session: LinkSession) {
        self.sessions.insert(addr, session);
    }
}
