//! # Multirole Core
//!
//! Core types and interfaces for the multirole content filter.
//!
//! This crate defines what the filter engine and its hosts share:
//!
//! - Viewer, authorization context, capability and role types
//! - The [`Authority`] collaborator that answers capability and role queries
//! - The [`TextFilter`] interface a host rendering pipeline drives
//! - The error hierarchy and the filter configuration
//!
//! `multirole_core` holds no filtering logic itself. The engine lives in
//! `multirole_filter`.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items for convenience
pub use config::{FilterConfig, ParseMode};
pub use error::{AuthorityError, ConfigError, Error, Result};
pub use traits::{Authority, TextFilter};
pub use types::{
    AuthorizationContext, CapabilityToken, FilterOutput, RoleAssignment, RoleShortname, Viewer,
    ViewerId,
};
