use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, EncodedSizeUser, KemCore, MlKem768};

/// Post-quantum KEM keypair folded into the first ProtocolFrame of a convo (§4.1, §4.6).
pub struct PqeKeypair {
    decap_key: <MlKem768 as KemCore>::DecapsulationKey,
    encap_key: <MlKem768 as KemCore>::EncapsulationKey,
}

impl PqeKeypair {
    pub fn encap_key_bytes(&self) -> Vec<u8> {
        self.encap_key.as_bytes().to_vec()
    }
}

pub fn pqe_keygen() -> PqeKeypair {
    let mut rng = rand::thread_rng();
    let (decap_key, encap_key) = MlKem768::generate(&mut rng);
    PqeKeypair { decap_key, encap_key }
}

/// Encapsulate to a peer's encapsulation key, producing `(ciphertext, shared_secret)`. The
/// ciphertext is carried as `ProtocolFrame.C` on the first frame of a convo; the shared secret
/// folds into the session key via `shorthash`.
pub fn pqe_encrypt(their_encap_key_bytes: &[u8]) -> Option<(Vec<u8>, [u8; 32])> {
    let encap_key_array = their_encap_key_bytes.try_into().ok()?;
    let encap_key =
        <MlKem768 as KemCore>::EncapsulationKey::from_bytes(encap_key_array);
    let mut rng = rand::thread_rng();
    let (ciphertext, shared_secret) = encap_key.encapsulate(&mut rng).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(shared_secret.as_slice());
    Some((ciphertext.to_vec(), out))
}

/// Decapsulate a ciphertext with our decapsulation key. A failure here is a hard error per
/// §4.1: the caller rejects the session rather than falling back.
pub fn pqe_decrypt(keypair: &PqeKeypair, ciphertext_bytes: &[u8]) -> Option<[u8; 32]> {
    let ciphertext = Ciphertext::<MlKem768>::try_from(ciphertext_bytes).ok()?;
    let shared_secret = keypair.decap_key.decapsulate(&ciphertext).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(shared_secret.as_slice());
    Some(out)
}
