use chacha20poly1305::aead::{Aead, generic_array::GenericArray};
use chacha20poly1305::{KeyInit, XChaCha20Poly1305};
use lokinet_crypto::shorthash;

const RESERVED_LABELS: [&str; 3] = ["loki", "snode", "localhost"];
const MAX_NAME_LEN: usize = 63 + 5; // 63-byte label budget plus ".loki"

/// Validate an ONS name per §8 seed test 6: must end in `.loki`, each dot-separated label is
/// 1-63 chars of alphanumerics/hyphens not starting or ending with a hyphen, not a reserved
/// word, and the IDNA "hyphen in 3rd/4th position" restriction applies unless the label is an
/// `xn--` punycode label.
pub fn name_is_valid(name: &str) -> bool {
    if name.len() > MAX_NAME_LEN {
        return false;
    }
    let Some(stem) = name.strip_suffix(".loki") else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    stem.split('.').all(label_is_valid)
}

fn label_is_valid(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    if RESERVED_LABELS.contains(&label) {
        return false;
    }
    let bytes = label.as_bytes();
    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return false;
    }
    if !bytes.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-') {
        return false;
    }
    if bytes.len() > 4 && &bytes[2..4] == b"--" && !label.starts_with("xn--") {
        return false;
    }
    true
}

/// Decrypt an ONS record: `[ciphertext+tag][24-byte nonce]`, symmetric key derived from the
/// queried name itself (§4.8: "a key derived from the name"). Returns the 32-byte target
/// address on success.
pub fn decrypt_ons_record(record: &[u8], name: &str) -> Option<[u8; 32]> {
    if record.len() <= 24 {
        return None;
    }
    let (ciphertext, nonce_bytes) = record.split_at(record.len() - 24);
    let key = shorthash(name.as_bytes());
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(&key));
    let nonce = GenericArray::from_slice(nonce_bytes);
    let plaintext = cipher.decrypt(nonce, ciphertext).ok()?;
    plaintext.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::to_zbase32;

    #[test]
    fn ons_record_decrypts_to_expected_address() {
        let record = hex::decode(
            "0ba76cbfdb6dc8f950da57ae781912f31c8ad0c55dbf86b88cb0391f563261a\
             9656571a817be4092969f8a78ee0fcee260424acb4a1f4bbdd27348b71de006\
             b6152dd04ed11bf3c4",
        )
        .unwrap();
        let address = decrypt_ons_record(&record, "jason.loki").expect("record decrypts");
        assert_eq!(to_zbase32(&address), "azfoj73snr9f3neh5c6sf7rtbaeabyxhr1m4un5aydsmsrxo964o");
    }

    #[test]
    fn ons_record_rejects_wrong_name() {
        let record = hex::decode(
            "0ba76cbfdb6dc8f950da57ae781912f31c8ad0c55dbf86b88cb0391f563261a\
             9656571a817be4092969f8a78ee0fcee260424acb4a1f4bbdd27348b71de006\
             b6152dd04ed11bf3c4",
        )
        .unwrap();
        assert!(decrypt_ons_record(&record, "wrong.loki").is_none());
    }

    #[test]
    fn name_validity_matches_seed_cases() {
        assert!(!name_is_valid("loki.loki"));
        assert!(!name_is_valid("snode.loki"));
        assert!(!name_is_valid("localhost.loki"));
        assert!(!name_is_valid("gayballs22.loki.loki"));
        assert!(!name_is_valid("-loki.loki"));
        assert!(!name_is_valid("super-mario-gayballs-.loki"));
        assert!(!name_is_valid("bn--lolexdeeeeee.loki"));
        assert!(!name_is_valid("2222222222a-.loki"));
        assert!(!name_is_valid(&format!("{}.loki", "a".repeat(87))));

        assert!(name_is_valid("xn--animewasindeedamistake.loki"));
        assert!(name_is_valid("memerionos.loki"));
        assert!(name_is_valid("whyis.xn--animehorrible.loki"));
        assert!(name_is_valid("the.goog.loki"));
        assert!(name_is_valid("420.loki"));
    }

    #[test]
    fn name_without_loki_suffix_is_invalid() {
        assert!(!name_is_valid("jason"));
    }
}
