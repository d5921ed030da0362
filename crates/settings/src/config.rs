//! Configuration types (§6: router-level settings, not persisted protocol state).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{default_settings_path, Result, SettingsError};

/// Top-level router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    #[serde(default)]
    pub network: NetworkSection,

    #[serde(default)]
    pub bind: BindSection,

    #[serde(default)]
    pub path: PathSection,

    #[serde(default)]
    pub dht: DhtSection,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub exit: ExitSection,

    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            network: NetworkSection::default(),
            bind: BindSection::default(),
            path: PathSection::default(),
            dht: DhtSection::default(),
            service: ServiceSection::default(),
            exit: ExitSection::default(),
            config_path: None,
        }
    }
}

impl RouterSettings {
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: RouterSettings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.clone());
            info!("loaded router settings from {:?}", path);
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.clone());
            Ok(settings)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("saved router settings to {:?}", path);
        Ok(())
    }
}

/// Network identity and connectivity targets (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    #[serde(default = "default_netid")]
    pub netid: String,

    /// `minConnectedRouters` (§4.9): relays should set this higher than the client default.
    #[serde(default = "default_min_connected")]
    pub min_connected_routers: u32,
}

fn default_netid() -> String {
    "lokinet".to_string()
}

fn default_min_connected() -> u32 {
    4
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self { netid: default_netid(), min_connected_routers: default_min_connected() }
    }
}

/// Where the link layer binds its UDP socket (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindSection {
    #[serde(default = "default_bind_address")]
    pub address: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:1090".to_string()
}

impl Default for BindSection {
    fn default() -> Self {
        Self { address: default_bind_address() }
    }
}

/// Path-build defaults (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSection {
    #[serde(default = "default_num_hops")]
    pub num_hops: u8,

    #[serde(default = "default_num_paths")]
    pub num_paths: u8,
}

fn default_num_hops() -> u8 {
    4
}

fn default_num_paths() -> u8 {
    6
}

impl Default for PathSection {
    fn default() -> Self {
        Self { num_hops: default_num_hops(), num_paths: default_num_paths() }
    }
}

/// DHT-tunable parameters. `intro_pow_difficulty` resolves open question (a): the PoW
/// difficulty for IntroSet publication is exposed as config rather than hardcoded, defaulting
/// to disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhtSection {
    #[serde(default)]
    pub intro_pow_difficulty: u32,
}

impl Default for DhtSection {
    fn default() -> Self {
        Self { intro_pow_difficulty: 0 }
    }
}

/// Hidden-service endpoint defaults (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_num_intros")]
    pub num_intros: u8,

    #[serde(default = "default_republish_interval")]
    pub republish_interval_secs: u64,
}

fn default_num_intros() -> u8 {
    4
}

fn default_republish_interval() -> u64 {
    5 * 60
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self { num_intros: default_num_intros(), republish_interval_secs: default_republish_interval() }
    }
}

/// Exit-mode routing (§9 open question c): gated behind the `exit-mode` feature at the crate
/// level; `dns_resolver` must be set for exit traffic to be routed regardless of this flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub dns_resolver: Option<String>,
}

impl Default for ExitSection {
    fn default() -> Self {
        Self { enabled: false, dns_resolver: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let settings = RouterSettings::default();
        assert_eq!(settings.network.netid, "lokinet");
        assert_eq!(settings.network.min_connected_routers, 4);
        assert_eq!(settings.path.num_hops, 4);
        assert_eq!(settings.path.num_paths, 6);
        assert_eq!(settings.dht.intro_pow_difficulty, 0);
        assert_eq!(settings.service.num_intros, 4);
        assert_eq!(settings.service.republish_interval_secs, 300);
        assert!(!settings.exit.enabled);
    }

    #[test]
    fn round_trips_through_json() {
        let mut settings = RouterSettings::default();
        settings.network.min_connected_routers = 10;
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: RouterSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.network.min_connected_routers, 10);
    }

    #[test]
    fn partial_json_fills_missing_sections_with_defaults() {
        let parsed: RouterSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.path.num_hops, 4);
    }
}
