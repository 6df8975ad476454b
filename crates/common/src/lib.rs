//! Common types, protocol definitions, and errors shared across `secret-code` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
