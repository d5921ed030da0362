use std::net::SocketAddr;

use lokinet_core::{RouterContact, RouterId, TunnelNonce};
use lokinet_crypto::{dh_client, dh_server, shorthash, EncryptionKeypair};

use crate::error::{LinkError, Result};
use crate::intro::LinkIntroMessage;

/// Default idle timeout; a Ready session sends a keep-alive at half this and closes at the full
/// interval with no traffic in either direction (§4.3).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initial,
    HandshakeSent,
    HandshakeAck,
    Ready,
    Closing,
    Rejected,
    Closed,
}

/// Per-peer link session, keyed by `(RouterID, remote UDP address)` (§4.3).
pub struct LinkSession {
    pub remote_addr: SocketAddr,
    pub remote_router: Option<RouterId>,
    pub state: SessionState,
    pub our_nonce: TunnelNonce,
    session_key: Option<[u8; 32]>,
    next_seq: u32,
    pub last_sent_secs: u64,
    pub last_recv_secs: u64,
    pub idle_timeout_secs: u64,
}

impl LinkSession {
    pub fn new_outbound(remote_addr: SocketAddr, now: u64) -> Self {
        let mut nonce = [0u8; 24];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);
        Self {
            remote_addr,
            remote_router: None,
            state: SessionState::Initial,
            our_nonce: nonce,
            session_key: None,
            next_seq: 0,
            last_sent_secs: now,
            last_recv_secs: now,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }

    /// Session that just arrived from an unknown address with no handshake yet; starts at
    /// `Initial` and moves to `HandshakeSent` once we send our own LIM in reply.
    pub fn new_inbound(remote_addr: SocketAddr, now: u64) -> Self {
        Self::new_outbound(remote_addr, now)
    }

    /// Next 24-bit fragmentation sequence number for this session.
    pub fn next_sequence(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq = (self.next_seq + 1) & 0x00FF_FFFF;
        seq
    }

    /// `Initial → HandshakeSent`: mark that we've sent our LIM.
    pub fn mark_handshake_sent(&mut self, now: u64) {
        self.state = SessionState::HandshakeSent;
        self.last_sent_secs = now;
    }

    /// Process the peer's LIM. Validates the signature and RC freshness, derives the session key
    /// via `transport_dh_*`, and transitions `HandshakeSent → HandshakeAck → Ready` (or `Initial`
    /// on the responder side, straight to `Ready`). Any failure transitions to `Rejected`.
    pub fn on_peer_lim(
        &mut self,
        lim: &LinkIntroMessage,
        our_transport: &EncryptionKeypair,
        local_netid: &str,
        now: u64,
        we_are_initiator: bool,
    ) -> Result<()> {
        if !lim.verify() {
            self.state = SessionState::Rejected;
            return Err(LinkError::HandshakeFailed("LIM signature invalid".into()));
        }
        if lim.rc.check_fresh(now, local_netid).is_err() {
            self.state = SessionState::Rejected;
            return Err(LinkError::HandshakeFailed("peer RC stale or wrong netid".into()));
        }

        let shared = if we_are_initiator {
            dh_client(&lim.rc.encryption_key, &our_transport.secret_key_bytes(), &lim.nonce)
        } else {
            dh_server(&lim.rc.encryption_key, &our_transport.secret_key_bytes(), &lim.nonce)
        };
        self.session_key = Some(shorthash(&shared));
        self.remote_router = Some(lim.rc.router_id);
        self.state = match self.state {
            SessionState::HandshakeSent => SessionState::Ready,
            _ => SessionState::Ready,
        };
        self.last_recv_secs = now;
        Ok(())
    }

    pub fn session_key(&self) -> Option<&[u8; 32]> {
        self.session_key.as_ref()
    }

    pub fn note_sent(&mut self, now: u64) {
        self.last_sent_secs = now;
    }

    pub fn note_received(&mut self, now: u64) {
        self.last_recv_secs = now;
    }

    /// Whether this session should emit an empty keep-alive right now.
    pub fn needs_keepalive(&self, now: u64) -> bool {
        self.state == SessionState::Ready
            && now.saturating_sub(self.last_sent_secs) >= self.idle_timeout_secs / 2
    }

    /// Whether this session has gone fully idle and should be closed.
    pub fn is_idle_expired(&self, now: u64) -> bool {
        self.state == SessionState::Ready
            && now.saturating_sub(self.last_recv_secs) >= self.idle_timeout_secs
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closing;
    }
}
