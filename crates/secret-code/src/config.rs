//! Configuration loading and validation for the secret-code service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Passphrase used when `SECRET_KEY` is unset or blank.
///
/// **Insecure.** It is public, so anyone can decrypt tokens produced under it.
/// Kept only so that peers running with their own default still interoperate.
pub const DEFAULT_SECRET_KEY: &str = "default_secret_key";

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Passphrase the codec key is derived from.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// HTTP header naming the payload kind of a transform request.
    #[serde(default = "default_payload_kind_header")]
    pub payload_kind_header: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.into()
}
fn default_listen_port() -> u16 {
    4000
}
fn default_payload_kind_header() -> String {
    "X-Payload-Kind".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Config::builder().add_source(config::Environment::default()))
    }

    fn load(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let mut c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        if c.secret_key.trim().is_empty() {
            c.secret_key = default_secret_key();
        }
        c.validate()?;
        Ok(c)
    }

    /// Returns `true` when the insecure built-in passphrase is in effect.
    pub fn uses_default_secret_key(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        axum::http::HeaderName::from_bytes(self.payload_kind_header.as_bytes())
            .context("PAYLOAD_KIND_HEADER must be a valid HTTP header name")?;
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("payload_kind_header", &self.payload_kind_header)
            .field("log_level", &self.log_level)
            .finish()
    }
}
