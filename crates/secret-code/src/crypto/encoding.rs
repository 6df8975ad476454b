//! Token text encoding: URL-safe base64 (RFC 4648 §5) without padding.

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    Engine as _,
};
use thiserror::Error;

/// Emits unpadded tokens. Decoding infers the missing padding from the token
/// length and also accepts padded input, which some peers send.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The token is not valid URL-safe base64.
#[derive(Debug, Error)]
#[error("malformed token: {0}")]
pub struct EncodingError(#[from] base64::DecodeError);

/// Encode raw bytes as a token. Never fails; empty input gives `""`.
pub fn encode(bytes: &[u8]) -> String {
    TOKEN_ENGINE.encode(bytes)
}

/// Decode a token back to raw bytes.
///
/// # Errors
///
/// Returns [`EncodingError`] for characters outside the URL-safe alphabet, a
/// length that cannot be padded to a whole block, or non-canonical trailing bits.
pub fn decode(token: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(TOKEN_ENGINE.decode(token)?)
}
