//! Exit-mode wire messages (§4.6): `ObtainExit`/`GrantExit`/`RejectExit` negotiate a session over
//! an already-built path; `UpdateExit` reassigns it to a new path; `CloseExit` tears it down;
//! `TransferTraffic` carries the actual IP packets once granted. Feature-gated behind `exit-mode`
//! per the resolver-availability open question this crate resolves in `session.rs`.

use std::collections::BTreeMap;

use lokinet_core::{CoreError, PathId, PubKey, SigBytes};
use lokinet_crypto::{sign_data, verify_signature, SigningKeypair};
use lokinet_wire::{signable_bytes, BenValue, Message};

const SIG_KEY: &[u8] = b"Z";

fn path_id_bytes(dict: &BTreeMap<Vec<u8>, BenValue>, key: &[u8], what: &str) -> Result<PathId, CoreError> {
    let bytes = dict
        .get(key)
        .and_then(BenValue::as_bytes)
        .ok_or_else(|| CoreError::Malformed(format!("{what} missing field {:?}", String::from_utf8_lossy(key))))?;
    let arr: [u8; 16] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::Malformed(format!("{what} path id is not 16 bytes")))?;
    Ok(PathId(arr))
}

fn pubkey_bytes(dict: &BTreeMap<Vec<u8>, BenValue>, key: &[u8], what: &str) -> Result<PubKey, CoreError> {
    let bytes = dict
        .get(key)
        .and_then(BenValue::as_bytes)
        .ok_or_else(|| CoreError::Malformed(format!("{what} missing field {:?}", String::from_utf8_lossy(key))))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::Malformed(format!("{what} key is not 32 bytes")))
}

fn sig_bytes(dict: &BTreeMap<Vec<u8>, BenValue>, what: &str) -> Result<SigBytes, CoreError> {
    let bytes = dict
        .get(SIG_KEY)
        .and_then(BenValue::as_bytes)
        .ok_or_else(|| CoreError::Malformed(format!("{what} missing signature field \"Z\"")))?;
    let arr: [u8; 64] =
        bytes.as_slice().try_into().map_err(|_| CoreError::Malformed(format!("{what} signature is not 64 bytes")))?;
    Ok(SigBytes(arr))
}

/// Ask the hop at the end of `path_id` to act as an exit for us, offering `exit_pubkey` as the
/// client's half of the exit-traffic encryption key. Signed by the requesting client.
#[derive(Debug, Clone)]
pub struct ObtainExitMessage {
    pub path_id: PathId,
    pub exit_pubkey: PubKey,
    /// Unix seconds after which the grant, if any, should be considered stale.
    pub expires_at: u64,
    pub signature: SigBytes,
}

impl ObtainExitMessage {
    pub fn sign(path_id: PathId, exit_pubkey: PubKey, expires_at: u64, signing_key: &SigningKeypair) -> Self {
        let mut msg = ObtainExitMessage { path_id, exit_pubkey, expires_at, signature: SigBytes::zero() };
        let signable = signable_bytes(&msg.to_dict(), SIG_KEY, 64);
        msg.signature = SigBytes(sign_data(signing_key, &signable));
        msg
    }

    pub fn verify(&self, requester_key: &PubKey) -> bool {
        let mut unsigned = self.to_dict();
        unsigned.insert(SIG_KEY.to_vec(), BenValue::Bytes(vec![0u8; 64]));
        let signable = BenValue::Dict(unsigned).encode();
        verify_signature(requester_key, &signable, &self.signature.0)
    }
}

impl Message for ObtainExitMessage {
    const TYPE_TAG: u8 = b'O';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"T".to_vec(), BenValue::Bytes(self.path_id.0.to_vec()));
        d.insert(b"K".to_vec(), BenValue::Bytes(self.exit_pubkey.to_vec()));
        d.insert(b"E".to_vec(), BenValue::Int(self.expires_at as i64));
        d.insert(SIG_KEY.to_vec(), BenValue::Bytes(self.signature.0.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let path_id = path_id_bytes(dict, b"T", "ObtainExit")?;
        let exit_pubkey = pubkey_bytes(dict, b"K", "ObtainExit")?;
        let expires_at = dict
            .get(b"E".as_slice())
            .and_then(BenValue::as_int)
            .ok_or_else(|| CoreError::Malformed("ObtainExit missing field \"E\"".into()))? as u64;
        let signature = sig_bytes(dict, "ObtainExit")?;
        Ok(ObtainExitMessage { path_id, exit_pubkey, expires_at, signature })
    }
}

/// Exit's reply granting the request, echoing the path and binding its own half of the exit key.
#[derive(Debug, Clone)]
pub struct GrantExitMessage {
    pub path_id: PathId,
    pub exit_pubkey: PubKey,
}

impl Message for GrantExitMessage {
    const TYPE_TAG: u8 = b'G';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"T".to_vec(), BenValue::Bytes(self.path_id.0.to_vec()));
        d.insert(b"K".to_vec(), BenValue::Bytes(self.exit_pubkey.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let path_id = path_id_bytes(dict, b"T", "GrantExit")?;
        let exit_pubkey = pubkey_bytes(dict, b"K", "GrantExit")?;
        Ok(GrantExitMessage { path_id, exit_pubkey })
    }
}

/// Exit's reply refusing the request, signed so the client can tell a genuine refusal apart from
/// a dropped packet on the path.
#[derive(Debug, Clone)]
pub struct RejectExitMessage {
    pub path_id: PathId,
    pub reason: String,
    pub signature: SigBytes,
}

impl RejectExitMessage {
    pub fn sign(path_id: PathId, reason: impl Into<String>, signing_key: &SigningKeypair) -> Self {
        let mut msg = RejectExitMessage { path_id, reason: reason.into(), signature: SigBytes::zero() };
        let signable = signable_bytes(&msg.to_dict(), SIG_KEY, 64);
        msg.signature = SigBytes(sign_data(signing_key, &signable));
        msg
    }

    pub fn verify(&self, exit_key: &PubKey) -> bool {
        let mut unsigned = self.to_dict();
        unsigned.insert(SIG_KEY.to_vec(), BenValue::Bytes(vec![0u8; 64]));
        let signable = BenValue::Dict(unsigned).encode();
        verify_signature(exit_key, &signable, &self.signature.0)
    }
}

impl Message for RejectExitMessage {
    const TYPE_TAG: u8 = b'J';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"T".to_vec(), BenValue::Bytes(self.path_id.0.to_vec()));
        d.insert(b"R".to_vec(), BenValue::Bytes(self.reason.as_bytes().to_vec()));
        d.insert(SIG_KEY.to_vec(), BenValue::Bytes(self.signature.0.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let path_id = path_id_bytes(dict, b"T", "RejectExit")?;
        let reason_bytes = dict
            .get(b"R".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("RejectExit missing field \"R\"".into()))?;
        let reason = String::from_utf8_lossy(reason_bytes).into_owned();
        let signature = sig_bytes(dict, "RejectExit")?;
        Ok(RejectExitMessage { path_id, reason, signature })
    }
}

/// Client moves an already-granted session onto a freshly built replacement path (§4.6: a path's
/// lifetime is shorter than a typical exit session, so sessions outlive any one path).
#[derive(Debug, Clone)]
pub struct UpdateExitMessage {
    pub old_path_id: PathId,
    pub new_path_id: PathId,
    pub signature: SigBytes,
}

impl UpdateExitMessage {
    pub fn sign(old_path_id: PathId, new_path_id: PathId, signing_key: &SigningKeypair) -> Self {
        let mut msg = UpdateExitMessage { old_path_id, new_path_id, signature: SigBytes::zero() };
        let signable = signable_bytes(&msg.to_dict(), SIG_KEY, 64);
        msg.signature = SigBytes(sign_data(signing_key, &signable));
        msg
    }

    pub fn verify(&self, requester_key: &PubKey) -> bool {
        let mut unsigned = self.to_dict();
        unsigned.insert(SIG_KEY.to_vec(), BenValue::Bytes(vec![0u8; 64]));
        let signable = BenValue::Dict(unsigned).encode();
        verify_signature(requester_key, &signable, &self.signature.0)
    }
}

impl Message for UpdateExitMessage {
    const TYPE_TAG: u8 = b'U';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"O".to_vec(), BenValue::Bytes(self.old_path_id.0.to_vec()));
        d.insert(b"T".to_vec(), BenValue::Bytes(self.new_path_id.0.to_vec()));
        d.insert(SIG_KEY.to_vec(), BenValue::Bytes(self.signature.0.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let old_path_id = path_id_bytes(dict, b"O", "UpdateExit")?;
        let new_path_id = path_id_bytes(dict, b"T", "UpdateExit")?;
        let signature = sig_bytes(dict, "UpdateExit")?;
        Ok(UpdateExitMessage { old_path_id, new_path_id, signature })
    }
}

/// Either side tears down a granted session. Unsigned: a relay on the path can also emit this
/// when the transit hop it rides on expires, so there's no single key that could sign it.
#[derive(Debug, Clone)]
pub struct CloseExitMessage {
    pub path_id: PathId,
}

impl Message for CloseExitMessage {
    const TYPE_TAG: u8 = b'C';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"T".to_vec(), BenValue::Bytes(self.path_id.0.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let path_id = path_id_bytes(dict, b"T", "CloseExit")?;
        Ok(CloseExitMessage { path_id })
    }
}

/// Carries one encrypted IP packet over a granted exit session (§4.6). The payload is already
/// sealed under the exit-session key negotiated in `ObtainExit`/`GrantExit`; this message only
/// carries it alongside the session it belongs to.
#[derive(Debug, Clone)]
pub struct TransferTrafficMessage {
    pub path_id: PathId,
    pub packet: Vec<u8>,
    pub counter: u64,
}

impl Message for TransferTrafficMessage {
    const TYPE_TAG: u8 = b'P';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"T".to_vec(), BenValue::Bytes(self.path_id.0.to_vec()));
        d.insert(b"X".to_vec(), BenValue::Bytes(self.packet.clone()));
        d.insert(b"N".to_vec(), BenValue::Int(self.counter as i64));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let path_id = path_id_bytes(dict, b"T", "TransferTraffic")?;
        let packet = dict
            .get(b"X".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("TransferTraffic missing field \"X\"".into()))?
            .to_vec();
        let counter = dict
            .get(b"N".as_slice())
            .and_then(BenValue::as_int)
            .ok_or_else(|| CoreError::Malformed("TransferTraffic missing field \"N\"".into()))? as u64;
        Ok(TransferTrafficMessage { path_id, packet, counter })
    }
}
