//! DHT (§4.7): XOR-metric Kademlia-like router-contact and introset storage, with
//! FindRouter/GotRouter, FindIntro/GotIntro, and PublishIntro transactions.

mod bucket;
mod dht;
mod error;
mod transaction;

pub use bucket::{xor_distance, KBucket, DEFAULT_FANOUT};
pub use dht::{is_terminal_hop, Dht, DEFAULT_PUBLISH_FANOUT, FRESHNESS_SKEW_SECS};
pub use error::{DhtError, Result};
pub use transaction::{PendingKind, PendingTransaction, TransactionKey, TransactionTable, DEFAULT_TIMEOUT_SECS};
