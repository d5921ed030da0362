use std::collections::BTreeMap;

use lokinet_core::CoreError;

use crate::value::BenValue;

/// Current wire protocol version, carried as the common `"V"` field (§4.4, §6).
pub const PROTOCOL_VERSION: i64 = 0;

/// A wire message whose outer shape is always a dict with first key `"A"` = one-byte type tag
/// (§4.4). Implementors provide the field-level dict; `encode`/`decode` below add and check the
/// common `A`/`V` envelope.
pub trait Message: Sized {
    const TYPE_TAG: u8;

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue>;
    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError>;
}

pub fn encode<M: Message>(msg: &M) -> Vec<u8> {
    let mut dict = msg.to_dict();
    dict.insert(b"A".to_vec(), BenValue::Bytes(vec![M::TYPE_TAG]));
    dict.insert(b"V".to_vec(), BenValue::Int(PROTOCOL_VERSION));
    BenValue::Dict(dict).encode()
}

pub fn decode<M: Message>(buf: &[u8]) -> Result<M, CoreError> {
    let value =
        BenValue::decode(buf).map_err(|e| CoreError::Malformed(e.to_string()))?;
    let dict = value
        .as_dict()
        .ok_or_else(|| CoreError::Malformed("outer wire value is not a dict".into()))?;

    let tag = dict
        .get(b"A".as_slice())
        .and_then(BenValue::as_bytes)
        .and_then(|b| b.first().copied())
        .ok_or_else(|| CoreError::Malformed("missing type tag \"A\"".into()))?;
    if tag != M::TYPE_TAG {
        return Err(CoreError::UnknownTypeTag(tag));
    }

    let version = dict
        .get(b"V".as_slice())
        .and_then(BenValue::as_int)
        .ok_or_else(|| CoreError::Malformed("missing version field \"V\"".into()))?;
    if version != PROTOCOL_VERSION {
        return Err(CoreError::VersionMismatch { expected: PROTOCOL_VERSION as u64, got: version as u64 });
    }

    M::from_dict(dict)
}

/// Produce the "to-be-signed" bytes for a dict-shaped message: the same dict, but with the
/// value at `sig_key` replaced by an all-zero byte string of the same length, then canonically
/// encoded (§4.4, §9 "signed fields zeroed before hashing"). Every signed message type signs and
/// verifies over exactly these bytes.
pub fn signable_bytes(dict: &BTreeMap<Vec<u8>, BenValue>, sig_key: &[u8], sig_len: usize) -> Vec<u8> {
    let mut zeroed = dict.clone();
    zeroed.insert(sig_key.to_vec(), BenValue::Bytes(vec![0u8; sig_len]));
    BenValue::Dict(zeroed).encode()
}
