//! Canonical bencode wire codec (§4.4).
//!
//! [`value::BenValue`] is the generic bencode value type; a `Dict` always iterates in canonical
//! sorted-key order because it's backed by a `BTreeMap`. [`message::Message`] layers the common
//! `A`/`V` envelope (one-byte type tag, protocol version) on top, and [`message::signable_bytes`]
//! produces the "signature zeroed" bytes every signed message type signs and verifies over.

mod message;
mod value;

pub use message::{decode, encode, signable_bytes, Message, PROTOCOL_VERSION};
pub use value::{BenValue, BencodeError};
