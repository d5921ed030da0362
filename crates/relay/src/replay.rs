//! Per-hop replay defense: each transit hop's upstream and downstream directions track recently
//! seen fragment nonces and reject repeats, since the symmetric onion layer alone doesn't prevent
//! a captured packet from being replayed verbatim.

use std::collections::VecDeque;

use lokinet_core::TunnelNonce;

/// Bound on remembered nonces per direction per hop; a hop handles a bounded rate of traffic, so
/// a sliding window of this size comfortably covers any plausible reordering/retransmit window.
const DEFAULT_WINDOW: usize = 2048;

pub struct ReplayWindow {
    seen: std::collections::HashSet<TunnelNonce>,
    order: VecDeque<TunnelNonce>,
    capacity: usize,
}

impl ReplayWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { seen: std::collections::HashSet::new(), order: VecDeque::new(), capacity }
    }

    /// Record `nonce` as seen; returns `false` if it was already present (a replay).
    pub fn check_and_insert(&mut self, nonce: TunnelNonce) -> bool {
        if !self.seen.insert(nonce) {
            return false;
        }
        self.order.push_back(nonce);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::new()
    }
}
