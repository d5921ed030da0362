use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::{PubKey, RouterId, SigBytes};

/// Default relay-contact lifetime: ~24h, per §3.
pub const RC_LIFETIME_SECS: u64 = 24 * 60 * 60;

/// One reachable address for a relay. `rank` is a tie-break hint for address selection;
/// lower is preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub rank: u16,
    pub dialect: String,
    pub pubkey: PubKey,
    pub ip: std::net::IpAddr,
    pub port: u16,
}

/// Self-signed descriptor of a relay.
///
/// Valid only if (a) the signature verifies under `signing_key`, (b)
/// `now - last_updated < RC_LIFETIME_SECS`, and (c) `netid` matches the local network's netid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterContact {
    pub router_id: RouterId,
    pub signing_key: PubKey,
    pub encryption_key: PubKey,
    pub addresses: Vec<AddressInfo>,
    pub netid: String,
    pub last_updated: u64,
    pub signature: SigBytes,
}

impl RouterContact {
    /// Bytes signed over: every field except the signature itself, in a fixed field order.
    /// Used both to produce `signature` and to re-derive the same bytes for verification.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&self.router_id);
        buf.extend_from_slice(&self.signing_key);
        buf.extend_from_slice(&self.encryption_key);
        buf.extend_from_slice(&(self.addresses.len() as u32).to_le_bytes());
        for a in &self.addresses {
            buf.extend_from_slice(&a.rank.to_le_bytes());
            buf.extend_from_slice(&(a.dialect.len() as u16).to_le_bytes());
            buf.extend_from_slice(a.dialect.as_bytes());
            buf.extend_from_slice(&a.pubkey);
            match a.ip {
                std::net::IpAddr::V4(v4) => {
                    buf.push(4);
                    buf.extend_from_slice(&v4.octets());
                }
                std::net::IpAddr::V6(v6) => {
                    buf.push(6);
                    buf.extend_from_slice(&v6.octets());
                }
            }
            buf.extend_from_slice(&a.port.to_le_bytes());
        }
        buf.extend_from_slice(&(self.netid.len() as u16).to_le_bytes());
        buf.extend_from_slice(self.netid.as_bytes());
        buf.extend_from_slice(&self.last_updated.to_le_bytes());
        buf
    }

    /// Structural and temporal validity check; does not itself verify the Ed25519 signature
    /// (callers without direct access to `lokinet-crypto` still need the expiry/netid checks).
    pub fn check_fresh(&self, now: u64, local_netid: &str) -> Result<()> {
        if self.netid != local_netid {
            return Err(CoreError::NetidMismatch {
                expected: local_netid.to_string(),
                got: self.netid.clone(),
            });
        }
        if now.saturating_sub(self.last_updated) >= RC_LIFETIME_SECS {
            return Err(CoreError::RcExpired);
        }
        Ok(())
    }
}
