//! Secret-code field codec.
//!
//! Protects an event's `secret_code` while it travels inside request and
//! response payloads, independent of transport security:
//!
//! ```text
//! plaintext ─AES-256-GCM(fresh nonce)→ nonce ‖ ciphertext ‖ tag ─base64url→ token
//! ```
//!
//! [`SecretCodeCodec`] is the entry point. The [`server`] module exposes the
//! same operations over HTTP for the `secret-code-svc` binary.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod payload;
pub mod server;
pub mod telemetry;

pub use codec::{CarriesSecretCode, CodecError, SecretCodeCodec};
pub use crypto::KeyContext;
pub use payload::PayloadKind;
