//! Error types for the multirole CLI.

use thiserror::Error;

/// Errors that can occur in the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Filter error: {0}")]
    Filter(#[from] multirole_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid command arguments: {0}")]
    InvalidArguments(String),
}
