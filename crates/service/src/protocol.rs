//! `ProtocolFrame` (§4.6 `'H'`): the end-to-end ciphertext exchanged between two hidden-service
//! endpoints once a convo is routed over a path. The first frame of a convo carries a PQ-KEM
//! ciphertext that, combined with an X25519 DH exchange, derives the session key every later
//! frame reuses; later frames omit the KEM ciphertext and just reuse the cached key under a
//! fresh nonce.

use std::collections::BTreeMap;

use lokinet_core::{ConvoTag, CoreError, SigBytes};
use lokinet_crypto::{dh_client, dh_server, pqe_decrypt, pqe_encrypt, shorthash, sign_data, verify_signature, xchacha20, PqeKeypair, SigningKeypair};
use lokinet_wire::{signable_bytes, BenValue, Message};

const SIG_KEY: &[u8] = b"Z";

/// One end-to-end frame of a convo.
#[derive(Debug, Clone)]
pub struct ProtocolFrame {
    pub convo_tag: ConvoTag,
    /// PQ-KEM ciphertext; `Some` only on the frame that establishes the session key.
    pub pqe_ciphertext: Option<Vec<u8>>,
    /// XChaCha20 ciphertext of the inner `ProtocolMessage` payload.
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 24],
    pub signature: SigBytes,
}

impl Message for ProtocolFrame {
    const TYPE_TAG: u8 = b'H';

    fn to_dict(&self) -> BTreeMap<Vec<u8>, BenValue> {
        let mut d = BTreeMap::new();
        d.insert(b"T".to_vec(), BenValue::Bytes(self.convo_tag.0.to_vec()));
        if let Some(c) = &self.pqe_ciphertext {
            d.insert(b"C".to_vec(), BenValue::Bytes(c.clone()));
        }
        d.insert(b"D".to_vec(), BenValue::Bytes(self.ciphertext.clone()));
        d.insert(b"N".to_vec(), BenValue::Bytes(self.nonce.to_vec()));
        d.insert(SIG_KEY.to_vec(), BenValue::Bytes(self.signature.0.to_vec()));
        d
    }

    fn from_dict(dict: &BTreeMap<Vec<u8>, BenValue>) -> Result<Self, CoreError> {
        let convo_tag_bytes = dict
            .get(b"T".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("ProtocolFrame missing field \"T\"".into()))?;
        let convo_tag: [u8; 16] = convo_tag_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::Malformed("ProtocolFrame convo tag is not 16 bytes".into()))?;

        let pqe_ciphertext = dict.get(b"C".as_slice()).and_then(BenValue::as_bytes).map(|b| b.to_vec());

        let ciphertext = dict
            .get(b"D".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("ProtocolFrame missing field \"D\"".into()))?
            .to_vec();

        let nonce_bytes = dict
            .get(b"N".as_slice())
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("ProtocolFrame missing field \"N\"".into()))?;
        let nonce: [u8; 24] =
            nonce_bytes.as_slice().try_into().map_err(|_| CoreError::Malformed("ProtocolFrame nonce is not 24 bytes".into()))?;

        let sig_bytes = dict
            .get(SIG_KEY)
            .and_then(BenValue::as_bytes)
            .ok_or_else(|| CoreError::Malformed("ProtocolFrame missing signature field \"Z\"".into()))?;
        let signature: [u8; 64] =
            sig_bytes.as_slice().try_into().map_err(|_| CoreError::Malformed("ProtocolFrame signature is not 64 bytes".into()))?;

        Ok(ProtocolFrame {
            convo_tag: ConvoTag(convo_tag),
            pqe_ciphertext,
            ciphertext,
            nonce,
            signature: SigBytes(signature),
        })
    }
}

fn sign_frame(signing: &SigningKeypair, frame: &mut ProtocolFrame) {
    let signable = signable_bytes(&frame.to_dict(), SIG_KEY, 64);
    frame.signature = SigBytes(sign_data(signing, &signable));
}

fn frame_signature_valid(sender_signkey: &[u8; 32], frame: &ProtocolFrame) -> bool {
    let signable = signable_bytes(&frame.to_dict(), SIG_KEY, 64);
    verify_signature(sender_signkey, &signable, &frame.signature.0)
}

fn random_nonce() -> [u8; 24] {
    let mut nonce = [0u8; 24];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);
    nonce
}

/// Build and sign the first frame of a convo: encapsulates to the recipient's PQ-KEM key,
/// combines the shared secret with an X25519 DH exchange to derive the session key, then
/// encrypts `plaintext` under it. Returns the frame and the session key to cache under the
/// frame's `ConvoTag`.
pub fn seal_first_frame(
    sender_signing: &SigningKeypair,
    sender_enc_secret: &[u8; 32],
    recipient_enc_pub: &[u8; 32],
    recipient_pqe_pub: &[u8; 32],
    convo_tag: ConvoTag,
    plaintext: &[u8],
) -> Option<(ProtocolFrame, [u8; 32])> {
    let (pqe_ciphertext, k_pqe) = pqe_encrypt(recipient_pqe_pub)?;
    let nonce = random_nonce();
    let dh_secret = dh_client(recipient_enc_pub, sender_enc_secret, &nonce);
    let session_key = shorthash(&[k_pqe.as_slice(), dh_secret.as_slice()].concat());

    let mut ciphertext = plaintext.to_vec();
    xchacha20(&mut ciphertext, &session_key, &nonce);

    let mut frame =
        ProtocolFrame { convo_tag, pqe_ciphertext: Some(pqe_ciphertext), ciphertext, nonce, signature: SigBytes::zero() };
    sign_frame(sender_signing, &mut frame);
    Some((frame, session_key))
}

/// Open the first frame of a convo: verify the sender's signature, decapsulate the PQ-KEM
/// ciphertext, re-derive the session key from our side of the DH exchange, and decrypt the
/// payload. Any failure — bad signature, missing `C`, KEM mismatch — is a hard rejection (§4.1):
/// there's no partial-trust fallback.
pub fn open_first_frame(
    sender_signkey: &[u8; 32],
    recipient_pqe: &PqeKeypair,
    recipient_enc_secret: &[u8; 32],
    sender_enc_pub: &[u8; 32],
    frame: &ProtocolFrame,
) -> Option<([u8; 32], Vec<u8>)> {
    if !frame_signature_valid(sender_signkey, frame) {
        return None;
    }
    let k_pqe = pqe_decrypt(recipient_pqe, frame.pqe_ciphertext.as_ref()?)?;
    let dh_secret = dh_server(sender_enc_pub, recipient_enc_secret, &frame.nonce);
    let session_key = shorthash(&[k_pqe.as_slice(), dh_secret.as_slice()].concat());

    let mut plaintext = frame.ciphertext.clone();
    xchacha20(&mut plaintext, &session_key, &frame.nonce);
    Some((session_key, plaintext))
}

/// Seal a later frame of an already-bootstrapped convo under its cached session key. No PQ-KEM
/// ciphertext is carried; a fresh nonce is still drawn per frame since the stream cipher needs a
/// unique one every time even though the key is reused.
pub fn seal_frame(sender_signing: &SigningKeypair, session_key: &[u8; 32], convo_tag: ConvoTag, plaintext: &[u8]) -> ProtocolFrame {
    let nonce = random_nonce();
    let mut ciphertext = plaintext.to_vec();
    xchacha20(&mut ciphertext, session_key, &nonce);

    let mut frame = ProtocolFrame { convo_tag, pqe_ciphertext: None, ciphertext, nonce, signature: SigBytes::zero() };
    sign_frame(sender_signing, &mut frame);
    frame
}

/// Open a later frame of an already-bootstrapped convo under its cached session key.
pub fn open_frame(sender_signkey: &[u8; 32], session_key: &[u8; 32], frame: &ProtocolFrame) -> Option<Vec<u8>> {
    if !frame_signature_valid(sender_signkey, frame) {
        return None;
    }
    let mut plaintext = frame.ciphertext.clone();
    xchacha20(&mut plaintext, session_key, &frame.nonce);
    Some(plaintext)
}
