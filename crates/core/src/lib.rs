//! Lokinet core data model.
//!
//! Fixed-size ids, the RouterContact/Node-DB record shape, the IntroSet/ServiceInfo hidden
//! service data model, and the shared path/transit-hop shapes used by the path, relay, and dht
//! crates. Contains no networking, no crypto implementation, and no bencode — those live in
//! `lokinet-crypto`, `lokinet-wire`, and the protocol crates that depend on this one.

mod error;
mod ids;
mod intro;
mod rc;
mod path;
mod transit;

pub use error::*;
pub use ids::*;
pub use intro::*;
pub use rc::*;
pub use path::*;
pub use transit::*;
