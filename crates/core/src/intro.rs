use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::{ConvoTag, PathId, PubKey, RouterId, SigBytes};

/// Authoritative max bencoded size of an IntroSet (§9 open question b: 4 KiB, not 2 KiB).
pub const MAX_INTROSET_SIZE: usize = 4096;

/// Skew tolerance for the DHT freshness comparison (§4.7).
pub const INTROSET_FRESHNESS_SKEW_SECS: u64 = 10;

/// "Send a frame to `router` tagged `path_id` before `expires_at` and it will reach me."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Introduction {
    pub router: RouterId,
    pub path_id: PathId,
    pub expires_at: u64,
    pub latency_ms: u32,
}

impl Introduction {
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Hidden-service identity: `{ enckey, signkey, vanity, version }`.
///
/// The canonical address is `blake2b(bencode(ServiceInfo))` truncated to 32 bytes; computing
/// that hash requires `lokinet-crypto` and `lokinet-wire`, so it lives as a free function there
/// rather than a method here (this crate has no crypto or bencode dependency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub enc_key: PubKey,
    pub sign_key: PubKey,
    pub vanity: [u8; 16],
    pub version: u8,
}

/// A hidden service's signed list of current reachable rendezvous introductions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroSet {
    pub service_info: ServiceInfo,
    pub introductions: Vec<Introduction>,
    pub pq_pubkey: [u8; 32],
    pub topic: Option<ConvoTag>,
    pub timestamp: u64,
    /// Proof-of-work nonce; absent unless the network configures a nonzero difficulty
    /// (open question (a): difficulty is config, not a hardcoded constant).
    pub pow: Option<u64>,
    pub signature: SigBytes,
}

impl IntroSet {
    /// Structural checks that don't require verifying the signature itself: every introduction
    /// unexpired, and `timestamp` not older than the newest intro's expiry minus path lifetime.
    pub fn check_structure(&self, now: u64, path_lifetime_secs: u64, encoded_len: usize) -> Result<()> {
        if encoded_len > MAX_INTROSET_SIZE {
            return Err(CoreError::IntroSetTooLarge { size: encoded_len, max: MAX_INTROSET_SIZE });
        }
        if self.introductions.is_empty() {
            return Err(CoreError::ProtocolViolation("introset has no introductions".into()));
        }
        for intro in &self.introductions {
            if intro.is_expired(now) {
                return Err(CoreError::IntroductionExpired);
            }
        }
        let newest_expiry = self.introductions.iter().map(|i| i.expires_at).max().unwrap_or(0);
        if self.timestamp + path_lifetime_secs < newest_expiry {
            return Err(CoreError::ProtocolViolation(
                "introset timestamp too old relative to its newest introduction".into(),
            ));
        }
        Ok(())
    }

    /// `new.T > existing.T + skew` per the DHT freshness policy (§4.7).
    pub fn is_fresher_than(&self, existing: &IntroSet) -> bool {
        self.timestamp > existing.timestamp + INTROSET_FRESHNESS_SKEW_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_introset(timestamp: u64, expires_at: u64) -> IntroSet {
        IntroSet {
            service_info: ServiceInfo {
                enc_key: [1u8; 32],
                sign_key: [2u8; 32],
                vanity: [0u8; 16],
                version: 0,
            },
            introductions: vec![Introduction {
                router: [3u8; 32],
                path_id: PathId([4u8; 16]),
                expires_at,
                latency_ms: 50,
            }],
            pq_pubkey: [5u8; 32],
            topic: None,
            timestamp,
            pow: None,
            signature: SigBytes::zero(),
        }
    }

    #[test]
    fn rejects_oversized_encoding() {
        let is = sample_introset(100, 200);
        let err = is.check_structure(50, 600, MAX_INTROSET_SIZE + 1).unwrap_err();
        assert!(matches!(err, CoreError::IntroSetTooLarge { .. }));
    }

    #[test]
    fn rejects_expired_introduction() {
        let is = sample_introset(100, 200);
        let err = is.check_structure(300, 600, 100).unwrap_err();
        assert!(matches!(err, CoreError::IntroductionExpired));
    }

    #[test]
    fn rejects_stale_timestamp_relative_to_expiry() {
        // timestamp(0) + path_lifetime(10) < newest_expiry(200) -> too old
        let is = sample_introset(0, 200);
        let err = is.check_structure(50, 10, 100).unwrap_err();
        assert!(matches!(err, CoreError::ProtocolViolation(_)));
    }

    #[test]
    fn accepts_well_formed_introset() {
        let is = sample_introset(100, 10_100);
        assert!(is.check_structure(200, 600, 100).is_ok());
    }

    #[test]
    fn freshness_requires_strictly_greater_than_skew() {
        let old = sample_introset(100, 10_100);
        let equal_within_skew = sample_introset(105, 10_100);
        let fresher = sample_introset(200, 10_100);
        assert!(!equal_within_skew.is_fresher_than(&old));
        assert!(fresher.is_fresher_than(&old));
    }
}
