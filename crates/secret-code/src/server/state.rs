//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::codec::SecretCodeCodec;
use crate::config::DEFAULT_SECRET_KEY;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Codec holding the lazily-derived key.
    pub codec: SecretCodeCodec,
    /// Name of the HTTP header used to identify the payload kind of each request.
    pub payload_kind_header: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] with the provided codec and header name.
    pub fn new(codec: SecretCodeCodec, payload_kind_header: String) -> Self {
        Self {
            codec,
            payload_kind_header: Arc::new(payload_kind_header),
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] whose key has not been derived yet, suitable for tests.
    fn default() -> Self {
        Self::new(
            SecretCodeCodec::from_passphrase(DEFAULT_SECRET_KEY),
            "X-Payload-Kind".into(),
        )
    }
}
