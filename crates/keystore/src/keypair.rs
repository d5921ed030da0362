use std::path::{Path, PathBuf};

use lokinet_crypto::{EncryptionKeypair, SigningKeypair};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("key file {0:?} has the wrong length")]
    BadLength(PathBuf),
}

fn read_key_file(path: &Path) -> Result<[u8; 32], KeystoreError> {
    let bytes =
        std::fs::read(path).map_err(|source| KeystoreError::Io { path: path.to_path_buf(), source })?;
    bytes.try_into().map_err(|_| KeystoreError::BadLength(path.to_path_buf()))
}

fn write_key_file(path: &Path, secret: &[u8; 32]) -> Result<(), KeystoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| KeystoreError::Io { path: path.to_path_buf(), source })?;
    }
    save_keypair_bytes(path, secret)
}

/// Write `bytes` to `path`, restricting permissions to the owner on unix.
pub fn save_keypair_bytes(path: &Path, bytes: &[u8]) -> Result<(), KeystoreError> {
    std::fs::write(path, bytes).map_err(|source| KeystoreError::Io { path: path.to_path_buf(), source })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .map_err(|source| KeystoreError::Io { path: path.to_path_buf(), source })?;
    }
    Ok(())
}

/// The raw-bytes file name for each of the router's three persistent keys (§6).
pub fn default_key_path(dir: &Path, kind: &str) -> PathBuf {
    dir.join(format!("{kind}.private"))
}

/// Load the Ed25519 signing key from `path`, or generate and persist a fresh one if the file
/// doesn't exist yet.
pub fn load_or_generate_signing_keypair(path: &Path) -> Result<SigningKeypair, KeystoreError> {
    if path.exists() {
        let secret = read_key_file(path)?;
        return Ok(SigningKeypair::from_secret_bytes(&secret));
    }
    let keypair = SigningKeypair::generate();
    write_key_file(path, &keypair.secret_key_bytes())?;
    Ok(keypair)
}

/// Load or generate an X25519 key (used for both `encryption.private` and `transport.private`).
pub fn load_or_generate_keypair(path: &Path) -> Result<EncryptionKeypair, KeystoreError> {
    if path.exists() {
        let secret = read_key_file(path)?;
        return Ok(EncryptionKeypair::from_secret_bytes(&secret));
    }
    let keypair = EncryptionKeypair::generate();
    write_key_file(path, &keypair.secret_key_bytes())?;
    Ok(keypair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_keypair_persists_across_loads() {
        let dir = tempfile_dir();
        let path = default_key_path(&dir, "identity");
        let first = load_or_generate_signing_keypair(&path).unwrap();
        let second = load_or_generate_signing_keypair(&path).unwrap();
        assert_eq!(first.public_key_bytes(), second.public_key_bytes());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn encryption_keypair_persists_across_loads() {
        let dir = tempfile_dir();
        let path = default_key_path(&dir, "encryption");
        let first = load_or_generate_keypair(&path).unwrap();
        let second = load_or_generate_keypair(&path).unwrap();
        assert_eq!(first.public_key_bytes(), second.public_key_bytes());
        std::fs::remove_dir_all(dir).ok();
    }

    fn tempfile_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("lokinet-keystore-test-{}", std::process::id()));
        dir
    }
}
