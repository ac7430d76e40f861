//! Encrypted persistence driver wrapper.
//!
//! This module provides a driver that wraps any other driver with
//! AES-256-GCM encryption at rest.
//!
//! ## Security Model
//!
//! - Each blob is encrypted independently with a fresh random nonce
//! - Blob layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//! - The blob path is authenticated as associated data, so a ciphertext
//!   copied to another path fails to decrypt
//! - Paths themselves stay in the clear; prefix listing must keep working
//! - Keys are never stored; they must be provided by the application

use crate::driver::PersistenceDriver;
use crate::error::{StorageError, StorageResult};
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const KDF_INFO: &[u8] = b"nimbus-blob-key-v1";

/// Encryption key for the encrypted driver.
///
/// The key is zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a new random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(StorageError::Encryption(format!(
                "invalid key size: expected {KEY_SIZE}, got {}",
                bytes.len()
            )));
        }
        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Derives a key from a passphrase using HKDF-SHA256.
    ///
    /// HKDF is not a password hash; the passphrase should already carry
    /// high entropy (e.g. a generated development secret).
    ///
    /// # Errors
    ///
    /// Returns an error if key expansion fails.
    pub fn derive_from_passphrase(passphrase: &[u8], salt: &[u8]) -> StorageResult<Self> {
        use hkdf::Hkdf;
        use sha2::Sha256;

        let hk = Hkdf::<Sha256>::new(Some(salt), passphrase);
        let mut bytes = [0u8; KEY_SIZE];
        hk.expand(KDF_INFO, &mut bytes)
            .map_err(|_| StorageError::Encryption("HKDF expand failed".to_string()))?;
        Ok(Self { bytes })
    }

    /// Returns the key as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A driver that encrypts every blob before handing it to an inner driver.
///
/// # Example
///
/// ```rust
/// use nimbus_storage::{EncryptedDriver, EncryptionKey, InMemoryDriver, PersistenceDriver};
///
/// let key = EncryptionKey::generate();
/// let driver = EncryptedDriver::new(InMemoryDriver::new(), key);
/// driver.put("/secret", b"plain").unwrap();
/// assert_eq!(driver.get("/secret").unwrap(), Some(b"plain".to_vec()));
/// ```
pub struct EncryptedDriver<D> {
    inner: D,
    cipher: Aes256Gcm,
}

impl<D: PersistenceDriver> EncryptedDriver<D> {
    /// Wraps `inner`, encrypting with `key`.
    pub fn new(inner: D, key: EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self { inner, cipher }
    }

    /// Returns the wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn encrypt(&self, path: &str, plaintext: &[u8]) -> StorageResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: path.as_bytes(),
                },
            )
            .map_err(|_| StorageError::Encryption(format!("encryption failed for {path}")))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend(ciphertext);
        Ok(blob)
    }

    fn decrypt(&self, path: &str, blob: &[u8]) -> StorageResult<Vec<u8>> {
        if blob.len() < NONCE_SIZE + TAG_SIZE {
            return Err(StorageError::Corrupted(format!(
                "encrypted blob at {path} is too short ({} bytes)",
                blob.len()
            )));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: path.as_bytes(),
                },
            )
            .map_err(|_| StorageError::Encryption(format!("authentication failed for {path}")))
    }
}

impl<D: PersistenceDriver> PersistenceDriver for EncryptedDriver<D> {
    fn get(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        match self.inner.get(path)? {
            Some(blob) => self.decrypt(path, &blob).map(Some),
            None => Ok(None),
        }
    }

    fn put(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let blob = self.encrypt(path, data)?;
        self.inner.put(path, &blob)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.inner.delete(path)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix)
    }
}

impl<D> std::fmt::Debug for EncryptedDriver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedDriver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryDriver;
    use std::sync::Arc;

    fn key(byte: u8) -> EncryptionKey {
        EncryptionKey::from_bytes(&[byte; KEY_SIZE]).unwrap()
    }

    #[test]
    fn encrypted_roundtrip() {
        let driver = EncryptedDriver::new(InMemoryDriver::new(), key(0x42));

        driver.put("/a/b", b"Hello, encrypted world!").unwrap();
        assert_eq!(
            driver.get("/a/b").unwrap(),
            Some(b"Hello, encrypted world!".to_vec())
        );
    }

    #[test]
    fn stored_bytes_are_not_plaintext() {
        let inner = Arc::new(InMemoryDriver::new());
        let driver = EncryptedDriver::new(Arc::clone(&inner), key(0x42));

        driver.put("/a", b"Secret data").unwrap();
        let raw = inner.get("/a").unwrap().unwrap();

        assert_eq!(raw.len(), NONCE_SIZE + b"Secret data".len() + TAG_SIZE);
        assert!(!raw.windows(6).any(|w| w == b"Secret"));
    }

    #[test]
    fn tampered_blob_fails() {
        let inner = Arc::new(InMemoryDriver::new());
        let driver = EncryptedDriver::new(Arc::clone(&inner), key(0x42));

        driver.put("/a", b"Secret data").unwrap();
        let mut raw = inner.get("/a").unwrap().unwrap();
        raw[NONCE_SIZE + 1] ^= 0xFF;
        inner.put("/a", &raw).unwrap();

        assert!(matches!(driver.get("/a"), Err(StorageError::Encryption(_))));
    }

    #[test]
    fn blob_moved_to_other_path_fails() {
        let inner = Arc::new(InMemoryDriver::new());
        let driver = EncryptedDriver::new(Arc::clone(&inner), key(0x42));

        driver.put("/a", b"Secret data").unwrap();
        let raw = inner.get("/a").unwrap().unwrap();
        inner.put("/b", &raw).unwrap();

        assert!(driver.get("/b").is_err());
    }

    #[test]
    fn different_keys_fail() {
        let inner = Arc::new(InMemoryDriver::new());
        EncryptedDriver::new(Arc::clone(&inner), key(0x42))
            .put("/a", b"Secret data")
            .unwrap();

        let other = EncryptedDriver::new(Arc::clone(&inner), key(0x43));
        assert!(other.get("/a").is_err());
    }

    #[test]
    fn short_blob_is_corrupted() {
        let inner = Arc::new(InMemoryDriver::new());
        inner.put("/a", b"tiny").unwrap();

        let driver = EncryptedDriver::new(Arc::clone(&inner), key(1));
        assert!(matches!(driver.get("/a"), Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn listing_passes_through() {
        let driver = EncryptedDriver::new(InMemoryDriver::new(), EncryptionKey::generate());
        driver.put("/q/one", b"1").unwrap();
        driver.put("/q/two", b"2").unwrap();

        assert_eq!(driver.list("/q/").unwrap(), vec!["/q/one", "/q/two"]);
    }

    #[test]
    fn passphrase_derivation_is_deterministic() {
        let a = EncryptionKey::derive_from_passphrase(b"dev-secret", b"salt").unwrap();
        let b = EncryptionKey::derive_from_passphrase(b"dev-secret", b"salt").unwrap();
        let c = EncryptionKey::derive_from_passphrase(b"dev-secret", b"pepper").unwrap();

        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn invalid_key_size() {
        assert!(EncryptionKey::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", key(7));
        assert!(rendered.contains("REDACTED"));
    }
}
