//! Error types for the multirole filter.
//!
//! Filtering itself never fails on malformed markup. The only failures are
//! those of the authorization collaborator, configuration loading and output
//! encoding.

use thiserror::Error;

use crate::types::AuthorizationContext;

/// Root error type for the multirole filter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Authority error: {0}")]
    Authority(#[from] AuthorityError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by an [`Authority`](crate::traits::Authority) implementation.
///
/// Any of these aborts the filter invocation that triggered the lookup.
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("Authorization context not found: {0}")]
    ContextNotFound(AuthorizationContext),

    #[error("Authority unavailable: {0}")]
    Unavailable(String),
}

/// Errors related to loading or saving filter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(String),

    #[error("Failed to write config file: {0}")]
    Write(String),

    #[error("Failed to parse {format} config: {message}")]
    Parse { format: &'static str, message: String },

    #[error("Failed to serialize {format} config: {message}")]
    Serialize { format: &'static str, message: String },

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type used throughout the multirole crates.
pub type Result<T> = std::result::Result<T, Error>;
