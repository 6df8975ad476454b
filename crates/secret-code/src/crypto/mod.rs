//! AES-256-GCM secret-code primitives.
//!
//! This module is intentionally free of HTTP and configuration dependencies.
//! It provides key derivation, the AEAD layer and the token text encoding used
//! by [`crate::codec::SecretCodeCodec`].
//!
//! # Token format
//!
//! ```text
//! base64url-no-pad( nonce[12] ‖ ciphertext ‖ tag[16] )
//! ```
//!
//! The key is the SHA-256 digest of the configured passphrase. Both ends of the
//! wire derive it the same way, so the format has no version prefix.

pub mod cipher;
pub mod encoding;
pub mod key;

pub use cipher::{DecryptionError, EncryptionError, NONCE_LEN, TAG_LEN};
pub use encoding::EncodingError;
pub use key::{KeyContext, KeyDerivationError, KeyDeriver, Sha256KeyDeriver, SymmetricKey, KEY_LEN};
