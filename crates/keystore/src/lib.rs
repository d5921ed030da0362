//! Lokinet keystore: load-or-generate persistence for the router's three keys
//! (`identity.private`, `encryption.private`, `transport.private`, §6) and the config/keystore
//! directory conventions they live under.

mod keypair;
mod paths;

pub use keypair::{
    default_key_path, load_or_generate_keypair, load_or_generate_signing_keypair,
    save_keypair_bytes, KeystoreError,
};
pub use paths::{default_config_dir, default_keystore_dir, expand_path};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Keystore error: {0}")]
    Keystore(#[from] KeystoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
