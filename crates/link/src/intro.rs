use std::collections::BTreeMap;

use lokinet_core::{CoreError, RouterContact, SigBytes, TunnelNonce};
use lokinet_crypto::{sign_data, verify_signature, SigningKeypair};
use lokinet_wire::{signable_bytes, BenValue, Message};

const SIG_KEY: &[u8] = b"Z";

/// LinkIntroMessage (§4.3): sent on `Initial → HandshakeSent` and again by the peer on receipt.
/// Carries the sender's RC, a fresh nonce, and a signature over both. The outer `A`/`V` envelope
/// (added by [`lokinet_wire::encode`]) carries the type tag and protocol version the spec calls
/// out separately.
#[derive(Debug, Clone)]
pub struct LinkIntroMessage {
    pub rc: RouterContact,
    pub nonce: TunnelNonce,
    pub signature: SigBytes,
}

impl LinkIntroMessage {
    /// Build and sign a fresh LIM for `rc` using `signing_key`, whose public half must match
    /// `rc.signing_key`.
    pub fn sign(rc: RouterContact, nonce: TunnelNonce, signing_key: &SigningKeypair) -> Self {
        let mut lim = LinkIntroMessage { rc, nonce, signature: SigBytes::zero() };
        let signable = signable_bytes(&lim.to_dict(), SIG_KEY, 64);
        let sig = sign_data(signing_key, &signable);
        lim.signature = SigBytes(sig);
        lim
    }

    /// Verify the embedded signature against `rc.signing_key`. Does not itself check RC freshness
    /// or netid; callers run [`RouterContact::check_fresh`] separately.
    pub fn verify(&self) -> bool {
        let mut unsigned_dict = self.to_dict();
        unsigned_dict.insert(SIG_KEY.to_vec(), BenValue::Bytes(vec![0u8; 64]));
        let signable = BenValue::Dict(unsigned_dict).encode();
        verify_signature(&self.rc.signing_key, &signable, &self.signature.0)
    }
}

impl Message for LinkIntroMessage {
    const TYPE_TAG: u8 = b'L';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(
            b"C".to_vec(),
            BenValue::Bytes(bincode::serialize(&self.rc).expect("RouterContact serializes")),
        );
        d.insert(b"N".to_vec(), BenValue::Bytes(self.nonce.to_vec()));
        d.insert(SIG_KEY.to_vec(), BenValue::Bytes(self.signature.0.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let rc_bytes = dict
            .get(b"C".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("LIM missing RC field \"C\"".into()))?;
        let rc: RouterContact = bincode::deserialize(rc_bytes)
            .map_err(|e| CoreError::Malformed(format!("bad RC encoding: {e}")))?;

        let nonce_bytes = dict
            .get(b"N".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("LIM missing nonce field \"N\"".into()))?;
        let nonce: TunnelNonce = nonce_bytes
            .try_into()
            .map_err(|_| CoreError::Malformed("LIM nonce is not 24 bytes".into()))?;

        let sig_bytes = dict
            .get(SIG_KEY)
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("LIM missing signature field \"Z\"".into()))?;
        let sig: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| CoreError::Malformed("LIM signature is not 64 bytes".into()))?;

        Ok(LinkIntroMessage { rc, nonce, signature: SigBytes(sig) })
    }
}
