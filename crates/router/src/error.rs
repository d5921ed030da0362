use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("settings error: {0}")]
    Settings(#[from] lokinet_settings::SettingsError),

    #[error("keystore error: {0}")]
    Keystore(#[from] lokinet_keystore::Error),
}

pub type Result<T> = std::result::Result<T, RouterError>;
