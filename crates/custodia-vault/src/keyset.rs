//! Vault keyset and master-key handling.
//!
//! The vault uses two independent subkeys: a 64-byte key-encryption key for
//! AES-256-SIV (deterministic sealing of entry keys) and a 32-byte value key
//! for AES-256-GCM. The keyset is generated once per vault, wrapped with a
//! device-held master key (AES-256-GCM), and persisted next to the database.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use custodia_core::{Error, Result};

/// GCM nonce size (96 bits).
pub(crate) const NONCE_SIZE: usize = 12;

const KEK_SIZE: usize = 64;
const VALUE_KEY_SIZE: usize = 32;
const MASTER_KEY_SIZE: usize = 32;

/// Unwrapped vault key material. Zeroized on drop.
pub struct Keyset {
    /// AES-256-SIV key for sealing entry keys.
    pub key_encryption_key: [u8; KEK_SIZE],
    /// AES-256-GCM key for sealing entry values.
    pub value_key: [u8; VALUE_KEY_SIZE],
}

impl Drop for Keyset {
    fn drop(&mut self) {
        self.key_encryption_key.zeroize();
        self.value_key.zeroize();
    }
}

impl Keyset {
    /// Generate a fresh random keyset.
    pub fn generate() -> Self {
        let mut kek = [0u8; KEK_SIZE];
        let mut value_key = [0u8; VALUE_KEY_SIZE];
        OsRng.fill_bytes(&mut kek);
        OsRng.fill_bytes(&mut value_key);
        Self {
            key_encryption_key: kek,
            value_key,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(KEK_SIZE + VALUE_KEY_SIZE);
        out.extend_from_slice(&self.key_encryption_key);
        out.extend_from_slice(&self.value_key);
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEK_SIZE + VALUE_KEY_SIZE {
            return Err(Error::Crypto(format!(
                "Invalid keyset length: {}",
                bytes.len()
            )));
        }
        let mut kek = [0u8; KEK_SIZE];
        let mut value_key = [0u8; VALUE_KEY_SIZE];
        kek.copy_from_slice(&bytes[..KEK_SIZE]);
        value_key.copy_from_slice(&bytes[KEK_SIZE..]);
        Ok(Self {
            key_encryption_key: kek,
            value_key,
        })
    }

    /// Wrap the keyset with the master key. Output is `nonce || ciphertext`.
    pub fn wrap(&self, master_key: &[u8; MASTER_KEY_SIZE]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(master_key)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let mut plaintext = self.to_bytes();
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
            .map_err(|e| Error::Crypto(format!("Keyset wrap failed: {}", e)))?;
        plaintext.zeroize();

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Unwrap a `nonce || ciphertext` blob with the master key.
    pub fn unwrap(blob: &[u8], master_key: &[u8; MASTER_KEY_SIZE]) -> Result<Self> {
        if blob.len() <= NONCE_SIZE {
            return Err(Error::Crypto("Wrapped keyset too short".into()));
        }
        let cipher = Aes256Gcm::new_from_slice(master_key)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
        let mut plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| Error::Crypto(format!("Keyset unwrap failed: {}", e)))?;
        let keyset = Keyset::from_bytes(&plaintext);
        plaintext.zeroize();
        keyset
    }
}

/// Load the device master key from `path`, creating it on first use.
///
/// The file holds 32 hex-encoded random bytes.
pub fn load_or_create_master_key(path: &Path) -> Result<[u8; MASTER_KEY_SIZE]> {
    if path.exists() {
        let encoded = std::fs::read_to_string(path)?;
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| Error::Crypto(format!("Invalid master key file: {}", e)))?;
        if bytes.len() != MASTER_KEY_SIZE {
            return Err(Error::Crypto(format!(
                "Invalid master key length: {}",
                bytes.len()
            )));
        }
        let mut key = [0u8; MASTER_KEY_SIZE];
        key.copy_from_slice(&bytes);
        return Ok(key);
    }

    let mut key = [0u8; MASTER_KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    std::fs::write(path, hex::encode(key))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(key)
}

/// Load the wrapped keyset from `path`, generating and persisting a fresh
/// one on first use. Returns the unwrapped keyset.
pub fn load_or_create_keyset(
    path: &Path,
    master_key: &[u8; MASTER_KEY_SIZE],
) -> Result<Keyset> {
    if path.exists() {
        let blob = std::fs::read(path)?;
        return Keyset::unwrap(&blob, master_key);
    }

    let keyset = Keyset::generate();
    let blob = keyset.wrap(master_key)?;
    std::fs::write(path, blob)?;
    Ok(keyset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let mut master = [0u8; 32];
        OsRng.fill_bytes(&mut master);

        let keyset = Keyset::generate();
        let kek = keyset.key_encryption_key;
        let value_key = keyset.value_key;

        let blob = keyset.wrap(&master).unwrap();
        let unwrapped = Keyset::unwrap(&blob, &master).unwrap();
        assert_eq!(unwrapped.key_encryption_key, kek);
        assert_eq!(unwrapped.value_key, value_key);
    }

    #[test]
    fn test_unwrap_wrong_master_key_fails() {
        let mut master = [0u8; 32];
        OsRng.fill_bytes(&mut master);
        let keyset = Keyset::generate();
        let blob = keyset.wrap(&master).unwrap();

        let wrong = [0u8; 32];
        assert!(Keyset::unwrap(&blob, &wrong).is_err());
    }

    #[test]
    fn test_unwrap_tampered_blob_fails() {
        let mut master = [0u8; 32];
        OsRng.fill_bytes(&mut master);
        let keyset = Keyset::generate();
        let mut blob = keyset.wrap(&master).unwrap();

        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        assert!(Keyset::unwrap(&blob, &master).is_err());
    }

    #[test]
    fn test_master_key_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.key");

        let first = load_or_create_master_key(&path).unwrap();
        let second = load_or_create_master_key(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyset_persists() {
        let dir = TempDir::new().unwrap();
        let master_path = dir.path().join("master.key");
        let keyset_path = dir.path().join("keyset.bin");

        let master = load_or_create_master_key(&master_path).unwrap();
        let first = load_or_create_keyset(&keyset_path, &master).unwrap();
        let second = load_or_create_keyset(&keyset_path, &master).unwrap();
        assert_eq!(first.value_key, second.value_key);
    }
}
