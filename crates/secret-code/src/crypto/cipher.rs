//! AES-256-GCM encryption and decryption of secret-code frames.
//!
//! **Nonces:** every call to [`encrypt`] draws a fresh 96-bit nonce from the OS
//! CSPRNG. Nothing about the nonce depends on the plaintext, a counter, or any
//! stored state. GCM nonce reuse under one key is catastrophic: it breaks both
//! confidentiality and authentication.
//!
//! A frame is `nonce ‖ ciphertext ‖ tag`; the tag is appended by the AEAD.

use aes_gcm::{
    aead::{Aead, AeadCore, OsRng},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

use super::key::SymmetricKey;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// The AEAD refused to seal the plaintext.
///
/// Only reachable for inputs far beyond the GCM message limit.
#[derive(Debug, Error)]
#[error("aead encryption failed")]
pub struct EncryptionError;

/// A frame could not be opened.
///
/// Deliberately carries no detail: a truncated frame, a wrong key and a
/// tampered byte all look the same to the caller.
#[derive(Debug, Error)]
#[error("decryption failed")]
pub struct DecryptionError;

/// Seal `plaintext` under `key` with a fresh random nonce.
///
/// Returns `nonce ‖ ciphertext ‖ tag`, i.e. `NONCE_LEN + plaintext.len() + TAG_LEN` bytes.
///
/// # Errors
///
/// Returns [`EncryptionError`] on an internal AEAD error.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let sealed = key
        .cipher()
        .encrypt(&nonce, plaintext)
        .map_err(|_| EncryptionError)?;

    let mut frame = Vec::with_capacity(NONCE_LEN + sealed.len());
    frame.extend_from_slice(&nonce);
    frame.extend_from_slice(&sealed);
    Ok(frame)
}

/// Open a frame produced by [`encrypt`].
///
/// The first [`NONCE_LEN`] bytes are the nonce; the rest is ciphertext + tag.
///
/// # Errors
///
/// Returns [`DecryptionError`] if the frame is shorter than the nonce or if tag
/// verification fails.
pub fn decrypt(key: &SymmetricKey, frame: &[u8]) -> Result<Vec<u8>, DecryptionError> {
    if frame.len() < NONCE_LEN {
        return Err(DecryptionError);
    }
    let (nonce, sealed) = frame.split_at(NONCE_LEN);
    key.cipher()
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| DecryptionError)
}
