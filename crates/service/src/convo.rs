use lokinet_core::{ConvoTag, ServiceInfo};

/// Per-ConvoTag session state (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvoState {
    Idle,
    Bootstrapping,
    Active,
    Closed,
}

/// One end-to-end conversation with a remote hidden service, keyed by its `ConvoTag`.
pub struct Convo {
    pub tag: ConvoTag,
    pub state: ConvoState,
    pub remote: Option<ServiceInfo>,
    pub session_key: Option<[u8; 32]>,
    pub last_active_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Default idle timeout before an Active convo is retired to Closed.
pub const DEFAULT_CONVO_IDLE_TIMEOUT_SECS: u64 = 2 * 60;

impl Convo {
    pub fn new(tag: ConvoTag, now: u64) -> Self {
        Self {
            tag,
            state: ConvoState::Idle,
            remote: None,
            session_key: None,
            last_active_secs: now,
            idle_timeout_secs: DEFAULT_CONVO_IDLE_TIMEOUT_SECS,
        }
    }

    /// `Idle → Bootstrapping` on the first outbound send before PQ-KEM has completed.
    pub fn begin_bootstrap(&mut self, now: u64) {
        if self.state == ConvoState::Idle {
            self.state = ConvoState::Bootstrapping;
            self.last_active_secs = now;
        }
    }

    /// `Bootstrapping → Active` once PQ-KEM succeeds and the session key + sender identity are
    /// known.
    pub fn complete_bootstrap(&mut self, remote: ServiceInfo, session_key: [u8; 32], now: u64) {
        self.remote = Some(remote);
        self.session_key = Some(session_key);
        self.state = ConvoState::Active;
        self.last_active_secs = now;
    }

    /// `Bootstrapping → Closed` on PQ-KEM failure; `Active → Closed` on explicit close.
    pub fn close(&mut self) {
        self.state = ConvoState::Closed;
    }

    pub fn touch(&mut self, now: u64) {
        self.last_active_secs = now;
    }

    /// Whether an Active convo has gone idle and should fall back to Idle (spec diagram:
    /// `Active ─idle→ Idle ─expire→ Closed`), dropping any pending payload.
    pub fn is_idle(&self, now: u64) -> bool {
        self.state == ConvoState::Active
            && now.saturating_sub(self.last_active_secs) >= self.idle_timeout_secs
    }
}
