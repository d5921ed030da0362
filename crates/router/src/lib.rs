//! Router core (§4.9): the logic loop that owns the DHT node table, link sessions, and
//! per-mode path/transit state, ticking once a second to expire dead state, maintain the
//! configured connection count, trigger path builds, and gossip our own RC.
//!
//! ## Usage
//!
//! ```no_run
//! use lokinet_router::{RouterBuilder, RouterRole};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut core = RouterBuilder::new()
//!         .role(RouterRole::Relay)
//!         .verbose(true)
//!         .build()?;
//!
//!     let actions = core.tick(1_700_000_000, 600);
//!     let _ = actions.connections_needed;
//!     Ok(())
//! }
//! ```

mod builder;
mod core;
mod error;

pub use builder::{RouterBuilder, RouterRole};
pub use core::{RouterCore, RouterMode, TickActions, GOSSIP_INTERVAL_SECS};
pub use error::{RouterError, Result};
