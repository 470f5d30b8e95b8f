//! Optional encryption of cache values at rest.
//!
//! When a deployment stores sensitive material (session lookups, signed-in
//! user records) in a shared cache server, values can be sealed with
//! AES-256-GCM before they leave the process. The stored layout is
//! `nonce || ciphertext`; a fresh nonce is drawn per write, so encrypting
//! the same value twice yields different payloads.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use remcache_core::Raw;
use thiserror::Error;

/// Required key length in bytes.
pub const KEY_SIZE: usize = 32;

const NONCE_SIZE: usize = 12;

/// Errors produced while sealing or opening cache values.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The configured key is not exactly [`KEY_SIZE`] bytes.
    #[error("cache encryption key must be {KEY_SIZE} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Encryption failed.
    #[error("failed to encrypt cache value")]
    Encrypt,

    /// The payload is too short, corrupted, or sealed with a different key.
    #[error("failed to decrypt cache value")]
    Decrypt,
}

/// Seals and opens cache values with a fixed AES-256-GCM key.
#[derive(Clone)]
pub struct ValueEncryption {
    cipher: Aes256Gcm,
}

impl ValueEncryption {
    /// Creates the encryption layer from a raw 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength(key.len()));
        }
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        })
    }

    /// Encrypts `plaintext` into a self-contained payload.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Raw, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::Encrypt)?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        payload.extend_from_slice(nonce.as_slice());
        payload.extend_from_slice(&ciphertext);
        Ok(Raw::from(payload))
    }

    /// Decrypts a payload produced by [`seal`](ValueEncryption::seal).
    pub fn open(&self, payload: &[u8]) -> Result<Raw, CryptoError> {
        if payload.len() < NONCE_SIZE {
            return Err(CryptoError::Decrypt);
        }
        let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decrypt)?;
        Ok(Raw::from(plaintext))
    }
}

impl fmt::Debug for ValueEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEncryption").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> [u8; KEY_SIZE] {
        [byte; KEY_SIZE]
    }

    #[test]
    fn rejects_short_key() {
        let err = ValueEncryption::new(b"short").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength(5)));
    }

    #[test]
    fn seal_open_round_trip() {
        let enc = ValueEncryption::new(&key(1)).unwrap();
        let sealed = enc.seal(b"some bytes").unwrap();
        assert_ne!(sealed.as_ref(), b"some bytes");
        let opened = enc.open(&sealed).unwrap();
        assert_eq!(opened.as_ref(), b"some bytes");
    }

    #[test]
    fn nonce_varies_per_seal() {
        let enc = ValueEncryption::new(&key(1)).unwrap();
        let first = enc.seal(b"v").unwrap();
        let second = enc.seal(b"v").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = ValueEncryption::new(&key(1)).unwrap().seal(b"v").unwrap();
        let err = ValueEncryption::new(&key(2)).unwrap().open(&sealed).unwrap_err();
        assert!(matches!(err, CryptoError::Decrypt));
    }

    #[test]
    fn truncated_payload_fails_to_open() {
        let enc = ValueEncryption::new(&key(1)).unwrap();
        let err = enc.open(b"tiny").unwrap_err();
        assert!(matches!(err, CryptoError::Decrypt));
    }
}
