//! Command implementations for the multirole CLI.

pub mod filter;
pub mod fingerprint;
pub mod scan;

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use multirole_filter::AuthorityManifest;

use crate::error::CliError;

/// Read the input file, or stdin when no path is given.
pub(crate) fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parse an RFC 3339 access snapshot time.
pub(crate) fn parse_snapshot(snapshot: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    snapshot
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|time| time.with_timezone(&Utc))
                .map_err(|e| CliError::InvalidArguments(format!("bad snapshot time '{}': {}", value, e)))
        })
        .transpose()
}

/// Load an authority manifest; the format follows the file extension.
pub(crate) fn load_manifest(path: &Path) -> Result<AuthorityManifest, CliError> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
        "json" => Ok(AuthorityManifest::from_json(&content)?),
        "toml" => Ok(AuthorityManifest::from_toml(&content)?),
        ext => Err(CliError::InvalidArguments(format!(
            "unsupported grants file format: {}",
            ext
        ))),
    }
}
