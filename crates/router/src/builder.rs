//! Fluent router initialization, adapted from the app-framework builder pattern: load or skip
//! logging/settings/keys, then hand back a ready-to-tick [`RouterCore`].

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use lokinet_core::{AddressInfo, RouterContact, SigBytes};
use lokinet_crypto::{sign_rc, Identity};
use lokinet_keystore::{default_key_path, default_keystore_dir, load_or_generate_keypair, load_or_generate_signing_keypair};
use lokinet_logging::{try_init as try_init_logging, LogLevel};
use lokinet_path::PathSet;
use lokinet_relay::TransitHopTable;
use lokinet_settings::RouterSettings;
use tracing::info;

use crate::core::{RouterCore, RouterMode};
use crate::error::{RouterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterRole {
    Client,
    Relay,
}

pub struct RouterBuilder {
    role: RouterRole,
    verbose: bool,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    skip_logging: bool,
    skip_settings: bool,
    skip_banner: bool,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            role: RouterRole::Client,
            verbose: false,
            log_level: None,
            config_path: None,
            skip_logging: false,
            skip_settings: false,
            skip_banner: false,
        }
    }

    pub fn role(mut self, role: RouterRole) -> Self {
        self.role = role;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn skip_logging(mut self) -> Self {
        self.skip_logging = true;
        self
    }

    pub fn skip_settings(mut self) -> Self {
        self.skip_settings = true;
        self
    }

    pub fn skip_banner(mut self) -> Self {
        self.skip_banner = true;
        self
    }

    pub fn build(self) -> Result<RouterCore> {
        if !self.skip_logging {
            let level = self.log_level.unwrap_or(if self.verbose { LogLevel::Debug } else { LogLevel::Info });
            let _ = try_init_logging(level);
        }

        let settings = if self.skip_settings {
            RouterSettings::default()
        } else if let Some(path) = &self.config_path {
            RouterSettings::load_from(path)?
        } else {
            RouterSettings::load_or_default()?
        };

        let keystore_dir = default_keystore_dir();
        let signing = load_or_generate_signing_keypair(&default_key_path(&keystore_dir, "identity"))?;
        let encryption = load_or_generate_keypair(&default_key_path(&keystore_dir, "encryption"))?;
        let transport = load_or_generate_keypair(&default_key_path(&keystore_dir, "transport"))?;
        let identity = Identity { signing, encryption, transport };

        let bind_addr: SocketAddr = settings
            .bind
            .address
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::from([0, 0, 0, 0]), 1090));

        let mut local_rc = RouterContact {
            router_id: identity.router_id(),
            signing_key: identity.signing.public_key_bytes(),
            encryption_key: identity.encryption.public_key_bytes(),
            addresses: vec![AddressInfo {
                rank: 0,
                dialect: "udp".into(),
                pubkey: identity.transport.public_key_bytes(),
                ip: bind_addr.ip(),
                port: bind_addr.port(),
            }],
            netid: settings.network.netid.clone(),
            last_updated: 0,
            signature: SigBytes::zero(),
        };
        sign_rc(&identity.signing, &mut local_rc);

        let mode = match self.role {
            RouterRole::Client => {
                let paths = PathSet::new(settings.path.num_hops as usize, settings.path.num_paths as usize);
                RouterMode::Client { paths }
            }
            RouterRole::Relay => RouterMode::Relay { transit: TransitHopTable::default() },
        };

        let core = RouterCore::new(local_rc, settings.network.min_connected_routers, mode);

        if !self.skip_banner && !self.skip_logging {
            info!("lokinet router starting: role={:?} netid={}", self.role, core.local_rc.netid);
        }

        Ok(core)
    }

    pub fn client() -> Result<RouterCore> {
        Self::new().role(RouterRole::Client).build()
    }

    pub fn relay() -> Result<RouterCore> {
        Self::new().role(RouterRole::Relay).build()
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
