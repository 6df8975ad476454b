//! [`SecretCodeCodec`]: the encrypt/decrypt contract callers use for the
//! `secret_code` field.

use std::sync::Arc;

use common::protocol::{AuthorizeRequest, Event, EventCreate, EventUpdate};
use thiserror::Error;
use tracing::warn;

use crate::crypto::{
    cipher, encoding, DecryptionError, EncodingError, EncryptionError, KeyContext,
    KeyDerivationError,
};

/// Errors produced inside the codec.
///
/// Only [`CodecError::KeyDerivation`] (and the practically unreachable
/// [`CodecError::Encryption`]) ever leave the codec; decode-side failures are
/// folded into a blank result by [`SecretCodeCodec::decrypt_secret_code`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

impl CodecError {
    /// Stable name of the error kind, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::KeyDerivation(_) => "key_derivation",
            CodecError::Encoding(_) => "encoding",
            CodecError::Decryption(_) => "decryption",
            CodecError::Encryption(_) => "encryption",
        }
    }
}

/// A payload type that carries an event secret code.
pub trait CarriesSecretCode {
    /// The secret-code field, or `None` when the payload omits it.
    fn secret_code_mut(&mut self) -> Option<&mut String>;
}

impl CarriesSecretCode for EventCreate {
    fn secret_code_mut(&mut self) -> Option<&mut String> {
        Some(&mut self.secret_code)
    }
}

impl CarriesSecretCode for EventUpdate {
    fn secret_code_mut(&mut self) -> Option<&mut String> {
        self.secret_code.as_mut()
    }
}

impl CarriesSecretCode for AuthorizeRequest {
    fn secret_code_mut(&mut self) -> Option<&mut String> {
        Some(&mut self.secret_code)
    }
}

impl CarriesSecretCode for Event {
    fn secret_code_mut(&mut self) -> Option<&mut String> {
        Some(&mut self.secret_code)
    }
}

/// Encrypts and decrypts secret codes under one lazily-derived key.
///
/// Cheap to clone; clones share the same [`KeyContext`].
#[derive(Clone, Debug)]
pub struct SecretCodeCodec {
    keys: Arc<KeyContext>,
}

impl SecretCodeCodec {
    pub fn new(keys: KeyContext) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Codec keyed by the SHA-256 of `passphrase`.
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self::new(KeyContext::new(passphrase))
    }

    /// Derive the key now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::KeyDerivation`] if the key cannot be derived; the
    /// codec must not be put into service in that case.
    pub async fn init(&self) -> Result<(), CodecError> {
        self.keys.key().await?;
        Ok(())
    }

    /// Returns `true` once the key has been derived.
    pub fn is_ready(&self) -> bool {
        self.keys.is_ready()
    }

    /// Encrypt a secret code into a token.
    ///
    /// An empty code maps to an empty token without touching the key or the
    /// RNG. Encrypting the same code twice gives two different tokens, so
    /// tokens must never be compared to test plaintext equality.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::KeyDerivation`] if the key cannot be derived.
    pub async fn encrypt_secret_code(&self, plain: &str) -> Result<String, CodecError> {
        if plain.is_empty() {
            return Ok(String::new());
        }
        let key = self.keys.key().await?;
        let frame = cipher::encrypt(key, plain.as_bytes())?;
        Ok(encoding::encode(&frame))
    }

    /// Decrypt a token back into a secret code.
    ///
    /// Never fails: an empty, malformed, truncated, tampered or foreign token
    /// yields `""`. The error kind is logged, the token is not.
    pub async fn decrypt_secret_code(&self, token: &str) -> String {
        if token.is_empty() {
            return String::new();
        }
        match self.try_decrypt(token).await {
            Ok(plain) => plain,
            Err(e) => {
                warn!(kind = e.kind(), "secret code could not be decrypted; using blank");
                String::new()
            }
        }
    }

    async fn try_decrypt(&self, token: &str) -> Result<String, CodecError> {
        let frame = encoding::decode(token)?;
        let key = self.keys.key().await?;
        let plain = cipher::decrypt(key, &frame)?;
        String::from_utf8(plain).map_err(|_| CodecError::Decryption(DecryptionError))
    }

    /// Replace the payload's plaintext secret code with a token before sending.
    ///
    /// # Errors
    ///
    /// Propagates [`SecretCodeCodec::encrypt_secret_code`] errors; the payload
    /// is left unchanged on error.
    pub async fn seal<T: CarriesSecretCode>(&self, payload: &mut T) -> Result<(), CodecError> {
        if let Some(field) = payload.secret_code_mut() {
            let token = self.encrypt_secret_code(field.as_str()).await?;
            *field = token;
        }
        Ok(())
    }

    /// Replace the payload's token with the decrypted secret code after receipt.
    pub async fn open<T: CarriesSecretCode>(&self, payload: &mut T) {
        if let Some(field) = payload.secret_code_mut() {
            let plain = self.decrypt_secret_code(field.as_str()).await;
            *field = plain;
        }
    }

    /// Check a submitted token against the stored secret code.
    ///
    /// A token that does not decrypt never matches, even when `expected` is empty.
    pub async fn matches(&self, token: &str, expected: &str) -> bool {
        let submitted = self.decrypt_secret_code(token).await;
        !submitted.is_empty() && submitted == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{key::MockKeyDeriver, NONCE_LEN, TAG_LEN};

    fn codec() -> SecretCodeCodec {
        SecretCodeCodec::from_passphrase("default_secret_key")
    }

    #[tokio::test]
    async fn round_trip() {
        let c = codec();
        for plain in ["HACK2024", "TEST_SECRET_CODE_123", "ünïcødé 🔑", " "] {
            let token = c.encrypt_secret_code(plain).await.unwrap();
            assert_ne!(token, plain);
            assert_eq!(c.decrypt_secret_code(&token).await, plain);
        }
    }

    #[tokio::test]
    async fn empty_maps_to_empty_without_key() {
        let c = codec();
        assert_eq!(c.encrypt_secret_code("").await.unwrap(), "");
        assert_eq!(c.decrypt_secret_code("").await, "");
        assert!(!c.is_ready());
    }

    #[tokio::test]
    async fn same_plaintext_gives_different_tokens() {
        let c = codec();
        let t1 = c.encrypt_secret_code("SAME_SECRET").await.unwrap();
        let t2 = c.encrypt_secret_code("SAME_SECRET").await.unwrap();
        assert_ne!(t1, t2);
        assert_eq!(c.decrypt_secret_code(&t1).await, "SAME_SECRET");
        assert_eq!(c.decrypt_secret_code(&t2).await, "SAME_SECRET");
    }

    #[tokio::test]
    async fn hack2024_token_shape() {
        let c = codec();
        let token = c.encrypt_secret_code("HACK2024").await.unwrap();
        assert_eq!(token.len(), 48);
        assert!(!token.contains('='));
        let frame = encoding::decode(&token).unwrap();
        assert_eq!(frame.len(), NONCE_LEN + 8 + TAG_LEN);
        assert_eq!(c.decrypt_secret_code(&token).await, "HACK2024");
    }

    #[tokio::test]
    async fn any_bit_flip_decrypts_to_blank() {
        let c = codec();
        let token = c.encrypt_secret_code("HACK2024").await.unwrap();
        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut bad = bytes.to_vec();
                bad[i] ^= 1 << bit;
                // Non-UTF-8 results cannot reach the codec as &str.
                let Ok(bad) = String::from_utf8(bad) else {
                    continue;
                };
                assert_eq!(c.decrypt_secret_code(&bad).await, "", "flip {i}:{bit}");
            }
        }
    }

    #[tokio::test]
    async fn garbage_decrypts_to_blank() {
        let c = codec();
        assert_eq!(c.decrypt_secret_code("not-valid-base64!!!").await, "");
        assert_eq!(c.decrypt_secret_code("AAAA").await, "");
        assert_eq!(c.decrypt_secret_code("A").await, "");
    }

    #[tokio::test]
    async fn foreign_key_decrypts_to_blank() {
        let a = SecretCodeCodec::from_passphrase("A");
        let b = SecretCodeCodec::from_passphrase("B");
        let token = a.encrypt_secret_code("HACK2024").await.unwrap();
        assert_eq!(b.decrypt_secret_code(&token).await, "");
    }

    #[tokio::test]
    async fn independent_codecs_in_one_process() {
        let a = SecretCodeCodec::from_passphrase("A");
        let a2 = SecretCodeCodec::from_passphrase("A");
        let token = a.encrypt_secret_code("shared").await.unwrap();
        assert_eq!(a2.decrypt_secret_code(&token).await, "shared");
    }

    #[tokio::test]
    async fn key_failure_propagates_from_encrypt() {
        let mut deriver = MockKeyDeriver::new();
        deriver
            .expect_derive()
            .returning(|_| Err(KeyDerivationError("no AES".into())));
        let c = SecretCodeCodec::new(KeyContext::with_deriver("x", Arc::new(deriver)));

        let err = c.encrypt_secret_code("HACK2024").await.unwrap_err();
        assert_eq!(err.kind(), "key_derivation");
        assert!(c.init().await.is_err());
        assert_eq!(c.decrypt_secret_code("AAAA").await, "");
    }

    #[tokio::test]
    async fn seal_and_open_event_payloads() {
        let c = codec();
        let mut create = EventCreate {
            event_name: "Hackathon".into(),
            points: 100,
            secret_code: "HACK2024".into(),
        };
        c.seal(&mut create).await.unwrap();
        assert_ne!(create.secret_code, "HACK2024");
        assert_eq!(create.event_name, "Hackathon");
        c.open(&mut create).await;
        assert_eq!(create.secret_code, "HACK2024");
    }

    #[tokio::test]
    async fn partial_update_without_code_is_untouched() {
        let c = codec();
        let mut update = EventUpdate {
            points: Some(5),
            ..Default::default()
        };
        c.seal(&mut update).await.unwrap();
        assert_eq!(update.secret_code, None);
        assert!(!c.is_ready());
    }

    #[tokio::test]
    async fn matches_checks_plaintext() {
        let c = codec();
        let mut req = AuthorizeRequest {
            event_id: "e1".into(),
            secret_code: "HACK2024".into(),
        };
        c.seal(&mut req).await.unwrap();
        assert!(c.matches(&req.secret_code, "HACK2024").await);
        assert!(!c.matches(&req.secret_code, "HACK2025").await);
        assert!(!c.matches("garbage!!", "").await);
        assert!(!c.matches("", "").await);
    }
}
