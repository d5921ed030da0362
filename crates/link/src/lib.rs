//! Link layer (§4.3): authenticated, encrypted, session-oriented transport between adjacent
//! relays over UDP datagrams, with handshake, fragmentation, flow control, and keep-alive.

mod error;
mod fragment;
mod intro;
mod queue;
mod session;

pub use error::{LinkError, Result};
pub use fragment::{split, Fragment, Reassembler, MAX_FRAGMENT_PAYLOAD, MAX_PACKET_SIZE};
pub use intro::LinkIntroMessage;
pub use queue::{CodelQueue, DEFAULT_INTERVAL, DEFAULT_TARGET};
pub use session::{LinkSession, SessionState, DEFAULT_IDLE_TIMEOUT_SECS};
