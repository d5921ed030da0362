//! Hidden-service endpoint (§4.8): persistent service identity, IntroSet publish lifecycle
//! support, convo session state, and ONS name resolution.

mod address;
mod cache;
mod convo;
mod error;
mod identity;
mod name;
mod protocol;
mod publish;

pub use address::{address_string, from_zbase32, service_address, to_zbase32};
pub use cache::{NameCache, DEFAULT_POSITIVE_TTL_SECS};
pub use convo::{Convo, ConvoState, DEFAULT_CONVO_IDLE_TIMEOUT_SECS};
pub use error::{Result, ServiceError};
pub use identity::ServiceIdentity;
pub use name::{decrypt_ons_record, name_is_valid};
pub use protocol::{seal_first_frame, seal_frame, open_first_frame, open_frame, ProtocolFrame};
pub use publish::{
    build_introset, introset_signable_bytes, publish_storage_key, republish_due, select_introductions, DEFAULT_NUM_INTROS,
};
