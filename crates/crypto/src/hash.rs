use blake2::digest::{FixedOutput, KeyInit, Mac, Update, VariableOutput};
use blake2::{Blake2bMac256, Blake2bVar, Blake2sMac256};

/// BLAKE2b-64: the general-purpose hash used for content addressing (e.g. `ServiceInfo`
/// addresses, §3).
pub fn hash(data: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2bVar::new(64).expect("64 is a valid blake2b output size");
    hasher.update(data);
    let mut out = [0u8; 64];
    hasher.finalize_variable(&mut out).expect("fixed 64-byte output buffer");
    out
}

/// BLAKE2b-32: used wherever a compact unkeyed content hash is enough.
pub fn shorthash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2bVar::new(32).expect("32 is a valid blake2b output size");
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize_variable(&mut out).expect("fixed 32-byte output buffer");
    out
}

/// Keyed BLAKE2s-32: the per-fragment / per-frame keyed MAC (§4.1, §4.3, §4.5).
pub fn hmac(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut mac = Blake2sMac256::new_from_slice(key).expect("32-byte key is valid for Blake2sMac256");
    Mac::update(&mut mac, data);
    mac.finalize_fixed().into()
}

/// Keyed BLAKE2b-32 MAC; used for the 32-byte MAC prefix of an `EncryptedFrame` (§4.5).
pub fn keyed_mac32(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut mac = Blake2bMac256::new_from_slice(key).expect("32-byte key is valid for Blake2bMac256");
    Mac::update(&mut mac, data);
    mac.finalize_fixed().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_sensitive_to_input() {
        let a = hash(b"hello");
        let b = hash(b"hello");
        let c = hash(b"hellp");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shorthash_output_is_32_bytes_and_deterministic() {
        let a = shorthash(b"onion layer");
        let b = shorthash(b"onion layer");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn hmac_depends_on_key() {
        let k1 = [1u8; 32];
        let k2 = [2u8; 32];
        assert_ne!(hmac(&k1, b"frame"), hmac(&k2, b"frame"));
    }

    #[test]
    fn keyed_mac32_depends_on_key_and_data() {
        let key = [9u8; 32];
        let m1 = keyed_mac32(&key, b"one");
        let m2 = keyed_mac32(&key, b"two");
        assert_ne!(m1, m2);
        assert_eq!(keyed_mac32(&key, b"one"), m1);
    }
}
