//! Router configuration (§6): the persisted settings a lokinet router reads on startup —
//! network identity, link bind address, path-build defaults, DHT tunables, hidden-service
//! defaults, and exit-mode routing — plus the directory conventions they live under.
//!
//! ## Usage
//!
//! ```no_run
//! use lokinet_settings::RouterSettings;
//!
//! let settings = RouterSettings::load_or_default()?;
//! let mut settings = settings;
//! settings.network.min_connected_routers = 6;
//! settings.save()?;
//! # Ok::<(), lokinet_settings::SettingsError>(())
//! ```

mod config;

pub use config::{
    BindSection, DhtSection, ExitSection, NetworkSection, PathSection, RouterSettings,
    ServiceSection,
};

use std::path::PathBuf;

use thiserror::Error;
use lokinet_keystore::default_config_dir;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("failed to create config directory: {0}")]
    CreateDirError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Default settings file path, `~/.lokinet/router.json` unless `LOKINET_HOME` is set.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("router.json")
}
