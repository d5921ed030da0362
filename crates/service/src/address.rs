use std::collections::BTreeMap;

use lokinet_core::{RouterId, ServiceInfo};
use lokinet_crypto::hash;
use lokinet_wire::BenValue;

const ZBASE32_ALPHABET: &[u8] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

/// Canonical bencode dict for a `ServiceInfo`, used both to derive its address and as the
/// to-be-signed content for messages that embed it.
fn service_info_dict(info: &ServiceInfo) -> BTreeMap<Vec<u8>, BenValue> {
    let mut d = BTreeMap::new();
    d.insert(b"e".to_vec(), BenValue::Bytes(info.enc_key.to_vec()));
    d.insert(b"n".to_vec(), BenValue::Int(info.version as i64));
    d.insert(b"s".to_vec(), BenValue::Bytes(info.sign_key.to_vec()));
    d.insert(b"v".to_vec(), BenValue::Bytes(info.vanity.to_vec()));
    d
}

/// `blake2b(bencode(ServiceInfo))` truncated to 32 bytes (§3).
pub fn service_address(info: &ServiceInfo) -> RouterId {
    let encoded = BenValue::Dict(service_info_dict(info)).encode();
    let digest = hash(&encoded);
    digest[..32].try_into().expect("hash output is at least 32 bytes")
}

/// Z-base-32 encode (lokinet's `.loki` address alphabet; unpadded, 5 bits/char, MSB-first).
pub fn to_zbase32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    for &byte in bytes {
        acc = (acc << 8) | byte as u32;
        acc_bits += 8;
        while acc_bits >= 5 {
            acc_bits -= 5;
            let idx = (acc >> acc_bits) & 0x1f;
            out.push(ZBASE32_ALPHABET[idx as usize] as char);
        }
    }
    if acc_bits > 0 {
        let idx = (acc << (5 - acc_bits)) & 0x1f;
        out.push(ZBASE32_ALPHABET[idx as usize] as char);
    }
    out
}

/// Inverse of [`to_zbase32`]. Returns `None` on an invalid character.
pub fn from_zbase32(s: &str) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    for c in s.chars() {
        let idx = ZBASE32_ALPHABET.iter().position(|&a| a as char == c)? as u32;
        acc = (acc << 5) | idx;
        acc_bits += 5;
        if acc_bits >= 8 {
            acc_bits -= 8;
            out.push(((acc >> acc_bits) & 0xff) as u8);
        }
    }
    Some(out)
}

/// Full address string for a service, e.g. `azfoj7...964o.loki`.
pub fn address_string(address: &RouterId) -> String {
    format!("{}.loki", to_zbase32(address))
}
