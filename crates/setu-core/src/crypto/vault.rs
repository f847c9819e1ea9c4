//! Cipher Vault: symmetric sealing for the local tier
//!
//! AES-256-GCM with a fresh random 96-bit nonce per `seal`. The nonce is not
//! secret and is stored in front of the ciphertext:
//!
//! ```text
//! sealed = nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{DecryptionError, SetuError};

/// Key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;
/// Nonce length in bytes
pub const NONCE_LEN: usize = 12;
/// Authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Symmetric key for the vault; wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_LEN]);

impl VaultKey {
    /// From existing key material
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse 64 hex characters
    pub fn from_hex(s: &str) -> Result<Self, SetuError> {
        let mut bytes = hex::decode(s.trim())
            .map_err(|e| SetuError::invalid(format!("vault key is not hex: {e}")))?;
        if bytes.len() != KEY_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SetuError::invalid(format!(
                "vault key must be {KEY_LEN} bytes, got {len}"
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(key))
    }

    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Hex form, for writing into a configuration file
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}

/// Seals and opens byte buffers with one configured key
#[derive(Clone)]
pub struct CipherVault {
    cipher: Aes256Gcm,
}

impl CipherVault {
    /// Create a vault for `key`
    pub fn new(key: &VaultKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(&key.0);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt `plaintext` under a fresh nonce and prepend the nonce
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, SetuError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| SetuError::crypto(format!("Encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Inverse of [`CipherVault::seal`] for the same key
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        let min = NONCE_LEN + TAG_LEN;
        if sealed.len() < min {
            return Err(DecryptionError::Truncated {
                len: sealed.len(),
                min,
            });
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| DecryptionError::Authentication)
    }
}

impl fmt::Debug for CipherVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherVault").finish_non_exhaustive()
    }
}
