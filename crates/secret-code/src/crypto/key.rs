//! Passphrase → AES-256 key derivation and the per-process key cell.

use std::fmt;
use std::sync::Arc;

use aes_gcm::{aead::KeyInit, Aes256Gcm};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// The key could not be derived or imported. Fatal for the codec.
#[derive(Debug, Error)]
#[error("key derivation failed: {0}")]
pub struct KeyDerivationError(pub String);

/// AES-256-GCM key restricted to encrypt/decrypt.
///
/// Only the keyed cipher is kept; the raw key bytes cannot be read back out.
pub struct SymmetricKey {
    cipher: Aes256Gcm,
}

impl SymmetricKey {
    /// Import raw key material.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDerivationError`] if `bytes` is not [`KEY_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyDerivationError> {
        let cipher = Aes256Gcm::new_from_slice(bytes).map_err(|_| {
            KeyDerivationError(format!(
                "expected {KEY_LEN} bytes of key material, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { cipher })
    }

    pub(crate) fn cipher(&self) -> &Aes256Gcm {
        &self.cipher
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Digest buffer, zeroed once the cipher has been keyed from it.
struct KeyMaterial([u8; KEY_LEN]);

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

/// Turns a passphrase into a [`SymmetricKey`].
#[cfg_attr(test, mockall::automock)]
pub trait KeyDeriver: Send + Sync {
    /// Derive the key for `passphrase`. Must be deterministic.
    fn derive(&self, passphrase: &str) -> Result<SymmetricKey, KeyDerivationError>;
}

/// SHA-256 of the UTF-8 passphrase, used directly as the AES-256 key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256KeyDeriver;

impl KeyDeriver for Sha256KeyDeriver {
    fn derive(&self, passphrase: &str) -> Result<SymmetricKey, KeyDerivationError> {
        let mut material = KeyMaterial([0u8; KEY_LEN]);
        material
            .0
            .copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
        SymmetricKey::from_bytes(&material.0)
    }
}

/// Lazily-derived key owned by one codec instance.
///
/// The first call to [`KeyContext::key`] runs the deriver; callers that race
/// it wait on the same in-flight derivation. After that the key is read-only
/// and shared without locking. A failed derivation leaves the cell empty, so
/// the codec stays unusable instead of running without a key.
pub struct KeyContext {
    passphrase: String,
    deriver: Arc<dyn KeyDeriver>,
    key: OnceCell<SymmetricKey>,
}

impl KeyContext {
    /// Context using [`Sha256KeyDeriver`].
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self::with_deriver(passphrase, Arc::new(Sha256KeyDeriver))
    }

    pub fn with_deriver(passphrase: impl Into<String>, deriver: Arc<dyn KeyDeriver>) -> Self {
        Self {
            passphrase: passphrase.into(),
            deriver,
            key: OnceCell::new(),
        }
    }

    /// Return the key, deriving it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDerivationError`] if the deriver fails.
    pub async fn key(&self) -> Result<&SymmetricKey, KeyDerivationError> {
        self.key
            .get_or_try_init(|| async {
                debug!("deriving secret-code key");
                self.deriver.derive(&self.passphrase)
            })
            .await
    }

    /// Returns `true` once the key has been derived.
    pub fn is_ready(&self) -> bool {
        self.key.initialized()
    }
}

impl fmt::Debug for KeyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the passphrase or key.
        f.debug_struct("KeyContext")
            .field("passphrase", &"[REDACTED]")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::cipher;

    #[test]
    fn derivation_is_deterministic() {
        let k1 = Sha256KeyDeriver.derive("default_secret_key").unwrap();
        let k2 = Sha256KeyDeriver.derive("default_secret_key").unwrap();
        let frame = cipher::encrypt(&k1, b"HACK2024").unwrap();
        assert_eq!(cipher::decrypt(&k2, &frame).unwrap(), b"HACK2024");
    }

    #[test]
    fn different_passphrases_give_different_keys() {
        let a = Sha256KeyDeriver.derive("A").unwrap();
        let b = Sha256KeyDeriver.derive("B").unwrap();
        let frame = cipher::encrypt(&a, b"code").unwrap();
        assert!(cipher::decrypt(&b, &frame).is_err());
    }

    #[test]
    fn rejects_wrong_length_material() {
        assert!(SymmetricKey::from_bytes(&[0u8; 16]).is_err());
        assert!(SymmetricKey::from_bytes(&[0u8; KEY_LEN]).is_ok());
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = Sha256KeyDeriver.derive("hunter2").unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
        let ctx = KeyContext::new("hunter2");
        assert!(!format!("{ctx:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn context_derives_lazily() {
        let ctx = KeyContext::new("default_secret_key");
        assert!(!ctx.is_ready());
        ctx.key().await.unwrap();
        assert!(ctx.is_ready());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_callers_derive_once() {
        let mut deriver = MockKeyDeriver::new();
        deriver
            .expect_derive()
            .times(1)
            .returning(|p| Sha256KeyDeriver.derive(p));
        let ctx = Arc::new(KeyContext::with_deriver("race", Arc::new(deriver)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ctx = ctx.clone();
                tokio::spawn(async move { ctx.key().await.map(|_| ()) })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(ctx.is_ready());
    }

    #[tokio::test]
    async fn failed_derivation_leaves_context_unusable() {
        let mut deriver = MockKeyDeriver::new();
        deriver
            .expect_derive()
            .returning(|_| Err(KeyDerivationError("unsupported primitive".into())));
        let ctx = KeyContext::with_deriver("x", Arc::new(deriver));
        assert!(ctx.key().await.is_err());
        assert!(!ctx.is_ready());
        assert!(ctx.key().await.is_err());
    }
}
