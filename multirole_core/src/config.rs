//! Configuration for the multirole filter.
//!
//! This module provides the filter configuration and loading and saving
//! it from files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How input text is parsed before filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Pick `Document` for input that opens with a doctype or holds an
    /// `<html>`, `<head>` or `<body>` start tag, otherwise `Fragment`.
    #[default]
    Auto,

    /// Parse as content of a `<body>` element and emit only that content.
    ///
    /// Input holding an `<html>`, `<head>` or `<body>` start tag is still
    /// parsed as a document, since a fragment parse drops those tags along
    /// with their attributes.
    Fragment,

    /// Parse and emit a complete document.
    Document,
}

impl ParseMode {
    /// Resolve the mode against the input. Never returns `Auto`.
    pub fn resolve(self, text: &str) -> ParseMode {
        match self {
            ParseMode::Document => ParseMode::Document,
            ParseMode::Auto if starts_with_doctype(text) => ParseMode::Document,
            _ if has_document_tag(text) => ParseMode::Document,
            _ => ParseMode::Fragment,
        }
    }
}

const DOCUMENT_TAGS: [&[u8]; 3] = [b"html", b"head", b"body"];

fn starts_with_doctype(text: &str) -> bool {
    let head = text.trim_start().as_bytes();
    head.get(..9)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(b"<!doctype"))
}

/// Whether the text holds an `<html>`, `<head>` or `<body>` start tag.
fn has_document_tag(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().filter(|(_, b)| **b == b'<').any(|(i, _)| {
        let rest = &bytes[i + 1..];
        DOCUMENT_TAGS.iter().any(|tag| {
            rest.len() >= tag.len()
                && rest[..tag.len()].eq_ignore_ascii_case(tag)
                && rest
                    .get(tag.len())
                    .map_or(true, |b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
        })
    })
}

/// Configuration for the multirole filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Whether to act on `data-capability` attributes.
    #[serde(default = "default_true")]
    pub capability_filter: bool,

    /// Whether to act on `data-role` attributes.
    #[serde(default = "default_true")]
    pub role_filter: bool,

    /// How input is parsed.
    #[serde(default)]
    pub parse_mode: ParseMode,
}

fn default_true() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capability_filter: true,
            role_filter: true,
            parse_mode: ParseMode::Auto,
        }
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("toml")
}

/// Load configuration from a file.
///
/// The format follows the file extension: `toml` or `json`.
pub fn load_config(path: &Path) -> Result<FilterConfig, ConfigError> {
    let ext = extension(path);

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

    match ext {
        "toml" => toml::from_str(&content).map_err(|e| ConfigError::Parse {
            format: "TOML",
            message: e.to_string(),
        }),
        "json" => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            format: "JSON",
            message: e.to_string(),
        }),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Save configuration to a file.
pub fn save_config(config: &FilterConfig, path: &Path) -> Result<(), ConfigError> {
    let ext = extension(path);

    let content = match ext {
        "toml" => toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
            format: "TOML",
            message: e.to_string(),
        })?,
        "json" => serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
            format: "JSON",
            message: e.to_string(),
        })?,
        _ => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
    };

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Write(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "Saved filter config");
    Ok(())
}
