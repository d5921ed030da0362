//! Exit session lifecycle (§4.6). An [`ExitContext`] is the per-router policy and session table;
//! it refuses to exist at all without a configured resolver (Open Question (c): exit-mode is
//! optional, and a router with no resolver must not pretend to route exit traffic).

use std::collections::HashMap;
use std::net::IpAddr;

use lokinet_core::{PathId, PubKey};

use crate::{ExitError, Result};

/// Where a granted session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSessionStatus {
    /// `ObtainExit` received, `GrantExit` not yet sent.
    Pending,
    Active,
    Closed,
}

#[derive(Debug, Clone)]
pub struct ExitSession {
    pub path_id: PathId,
    pub client_pubkey: PubKey,
    pub status: ExitSessionStatus,
    pub granted_at: u64,
    pub expires_at: u64,
    pub upstream_bytes: u64,
    pub downstream_bytes: u64,
}

impl ExitSession {
    fn new(path_id: PathId, client_pubkey: PubKey, now: u64, expires_at: u64) -> Self {
        ExitSession {
            path_id,
            client_pubkey,
            status: ExitSessionStatus::Pending,
            granted_at: now,
            expires_at,
            upstream_bytes: 0,
            downstream_bytes: 0,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Per-router exit policy: the resolver it forwards DNS through and the destinations it refuses
/// to route regardless (§4.6 doesn't mandate a blocklist, but every exit implementation needs
/// one to avoid becoming an open relay for its own loopback/link-local ranges).
#[derive(Debug, Clone)]
pub struct ExitPolicy {
    pub dns_resolver: IpAddr,
    pub blocked: Vec<IpAddr>,
}

impl ExitPolicy {
    pub fn is_blocked(&self, dest: &IpAddr) -> bool {
        dest.is_loopback() || dest.is_unspecified() || self.blocked.contains(dest)
    }
}

/// Live exit-mode state for one router: the resolver policy plus every session currently
/// Pending or Active, keyed by the path it rides on.
pub struct ExitContext {
    policy: ExitPolicy,
    sessions: HashMap<PathId, ExitSession>,
}

impl ExitContext {
    /// Construct an exit context. Fails per Open Question (c) if no resolver is configured —
    /// callers should treat that as "exit mode stays disabled on this router", not a fatal error.
    pub fn new(dns_resolver: Option<IpAddr>, blocked: Vec<IpAddr>) -> Result<Self> {
        let dns_resolver = dns_resolver.ok_or(ExitError::ResolverNotConfigured)?;
        Ok(ExitContext { policy: ExitPolicy { dns_resolver, blocked }, sessions: HashMap::new() })
    }

    pub fn resolver(&self) -> IpAddr {
        self.policy.dns_resolver
    }

    /// Record an `ObtainExit` as Pending. Returns the session so the caller can decide whether to
    /// grant or reject it.
    pub fn obtain(&mut self, path_id: PathId, client_pubkey: PubKey, now: u64, lifetime_secs: u64) -> &ExitSession {
        self.sessions
            .entry(path_id)
            .or_insert_with(|| ExitSession::new(path_id, client_pubkey, now, now + lifetime_secs))
    }

    /// Transition a Pending session to Active, as the exit does once it has sent `GrantExit`.
    pub fn grant(&mut self, path_id: PathId) -> Result<()> {
        let session = self.sessions.get_mut(&path_id).ok_or(ExitError::UnknownSession(session_tag(&path_id)))?;
        if session.status == ExitSessionStatus::Active {
            return Err(ExitError::AlreadyGranted(session_tag(&path_id)));
        }
        session.status = ExitSessionStatus::Active;
        Ok(())
    }

    /// Move a session onto a new path id (`UpdateExit`), preserving its traffic counters.
    pub fn update_path(&mut self, old_path_id: PathId, new_path_id: PathId) -> Result<()> {
        let mut session =
            self.sessions.remove(&old_path_id).ok_or(ExitError::UnknownSession(session_tag(&old_path_id)))?;
        session.path_id = new_path_id;
        self.sessions.insert(new_path_id, session);
        Ok(())
    }

    pub fn close(&mut self, path_id: PathId) {
        if let Some(session) = self.sessions.get_mut(&path_id) {
            session.status = ExitSessionStatus::Closed;
        }
    }

    /// Check whether traffic to `dest` should be routed for the Active session on `path_id`.
    pub fn check_route(&self, path_id: PathId, dest: IpAddr, now: u64) -> Result<()> {
        let session = self.sessions.get(&path_id).ok_or(ExitError::UnknownSession(session_tag(&path_id)))?;
        if session.status != ExitSessionStatus::Active {
            return Err(ExitError::UnknownSession(session_tag(&path_id)));
        }
        if session.is_expired(now) {
            return Err(ExitError::UnknownSession(session_tag(&path_id)));
        }
        if self.policy.is_blocked(&dest) {
            return Err(ExitError::BlockedDestination(dest.to_string()));
        }
        Ok(())
    }

    pub fn record_upstream(&mut self, path_id: PathId, bytes: u64) {
        if let Some(session) = self.sessions.get_mut(&path_id) {
            session.upstream_bytes += bytes;
        }
    }

    pub fn record_downstream(&mut self, path_id: PathId, bytes: u64) {
        if let Some(session) = self.sessions.get_mut(&path_id) {
            session.downstream_bytes += bytes;
        }
    }

    pub fn evict_expired(&mut self, now: u64) {
        self.sessions.retain(|_, session| !session.is_expired(now));
    }

    pub fn session(&self, path_id: PathId) -> Option<&ExitSession> {
        self.sessions.get(&path_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// `ExitError::UnknownSession`/`AlreadyGranted` carry a `u64` tag for display purposes; derive it
/// from the low 8 bytes of the path id rather than widening the error type to hold a `PathId`.
fn session_tag(path_id: &PathId) -> u64 {
    u64::from_be_bytes(path_id.0[..8].try_into().expect("PathId is 16 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn policy() -> (Option<IpAddr>, Vec<IpAddr>) {
        (Some(IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9))), vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))])
    }

    #[test]
    fn refuses_to_construct_without_a_resolver() {
        let err = ExitContext::new(None, vec![]).unwrap_err();
        assert!(matches!(err, ExitError::ResolverNotConfigured));
    }

    #[test]
    fn obtain_then_grant_then_route_happy_path() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let path_id = PathId::random();
        ctx.obtain(path_id, [1u8; 32], 1000, 600);
        ctx.grant(path_id).unwrap();

        let dest = IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34));
        assert!(ctx.check_route(path_id, dest, 1100).is_ok());
    }

    #[test]
    fn routing_before_grant_is_refused() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let path_id = PathId::random();
        ctx.obtain(path_id, [1u8; 32], 1000, 600);

        let dest = IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34));
        assert!(matches!(ctx.check_route(path_id, dest, 1000), Err(ExitError::UnknownSession(_))));
    }

    #[test]
    fn routing_to_loopback_is_blocked() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let path_id = PathId::random();
        ctx.obtain(path_id, [1u8; 32], 1000, 600);
        ctx.grant(path_id).unwrap();

        let dest = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(matches!(ctx.check_route(path_id, dest, 1000), Err(ExitError::BlockedDestination(_))));
    }

    #[test]
    fn routing_to_explicitly_blocked_destination_is_refused() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let path_id = PathId::random();
        ctx.obtain(path_id, [1u8; 32], 1000, 600);
        ctx.grant(path_id).unwrap();

        let dest = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert!(matches!(ctx.check_route(path_id, dest, 1000), Err(ExitError::BlockedDestination(_))));
    }

    #[test]
    fn double_grant_is_rejected() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let path_id = PathId::random();
        ctx.obtain(path_id, [1u8; 32], 1000, 600);
        ctx.grant(path_id).unwrap();
        assert!(matches!(ctx.grant(path_id), Err(ExitError::AlreadyGranted(_))));
    }

    #[test]
    fn update_path_moves_session_and_preserves_counters() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let old_path = PathId::random();
        let new_path = PathId::random();
        ctx.obtain(old_path, [1u8; 32], 1000, 600);
        ctx.grant(old_path).unwrap();
        ctx.record_upstream(old_path, 512);

        ctx.update_path(old_path, new_path).unwrap();
        assert!(ctx.session(old_path).is_none());
        assert_eq!(ctx.session(new_path).unwrap().upstream_bytes, 512);
    }

    #[test]
    fn expired_sessions_are_evicted() {
        let (resolver, blocked) = policy();
        let mut ctx = ExitContext::new(resolver, blocked).unwrap();
        let path_id = PathId::random();
        ctx.obtain(path_id, [1u8; 32], 1000, 60);
        ctx.evict_expired(2000);
        assert_eq!(ctx.session_count(), 0);
    }
}
