//! AEAD sealing for vault entries.
//!
//! Entry keys are sealed with AES-256-SIV: deterministic, so the sealed key
//! doubles as the lookup key in the database. Entry values are sealed with
//! AES-256-GCM under a fresh random nonce per write.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use aes_siv::siv::Aes256Siv;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;

use custodia_core::{Error, Result};

use crate::keyset::{Keyset, NONCE_SIZE};

/// Cipher pair derived from an unwrapped keyset.
pub struct VaultCipher {
    // Aes256Siv::encrypt takes &mut self (internal CMAC state).
    key_cipher: Mutex<Aes256Siv>,
    value_cipher: Aes256Gcm,
}

impl VaultCipher {
    pub fn new(keyset: &Keyset) -> Result<Self> {
        let key_cipher = Aes256Siv::new_from_slice(&keyset.key_encryption_key)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        let value_cipher = Aes256Gcm::new_from_slice(&keyset.value_key)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        Ok(Self {
            key_cipher: Mutex::new(key_cipher),
            value_cipher,
        })
    }

    /// Deterministically seal an entry key. Same key always yields the same
    /// ciphertext, which is what makes sealed-key lookup possible.
    pub fn seal_key(&self, key: &str) -> Result<Vec<u8>> {
        let headers: [&[u8]; 0] = [];
        self.key_cipher
            .lock()
            .encrypt(headers, key.as_bytes())
            .map_err(|e| Error::Crypto(format!("Key sealing failed: {}", e)))
    }

    /// Seal an entry value. Returns `(nonce, ciphertext)`.
    pub fn seal_value(&self, value: &str) -> Result<([u8; NONCE_SIZE], Vec<u8>)> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .value_cipher
            .encrypt(Nonce::from_slice(&nonce), value.as_bytes())
            .map_err(|e| Error::Crypto(format!("Value sealing failed: {}", e)))?;
        Ok((nonce, ciphertext))
    }

    /// Open a sealed entry value.
    pub fn open_value(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<String> {
        if nonce.len() != NONCE_SIZE {
            return Err(Error::Crypto(format!(
                "Invalid nonce length: {}",
                nonce.len()
            )));
        }
        let plaintext = self
            .value_cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| Error::Crypto(format!("Value opening failed: {}", e)))?;
        String::from_utf8(plaintext).map_err(|e| Error::Crypto(e.to_string()))
    }
}
