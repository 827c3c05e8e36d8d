//! Core types for the multirole filter.
//!
//! This module defines the data shared between the filter engine, the
//! authorization collaborator and the host. Identifiers are opaque strings;
//! the host decides what they look like.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identity of the viewer content is rendered for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(pub String);

impl ViewerId {
    /// Create a viewer ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ViewerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ViewerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// The viewer a filter invocation runs for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// Viewer identity.
    pub id: ViewerId,

    /// When the viewer's access data was last computed, if known.
    #[serde(default)]
    pub access_snapshot: Option<DateTime<Utc>>,
}

impl Viewer {
    /// Create a viewer with no recorded access snapshot.
    pub fn new(id: impl Into<ViewerId>) -> Self {
        Self {
            id: id.into(),
            access_snapshot: None,
        }
    }

    /// Set the time the viewer's access data was last computed.
    pub fn with_access_snapshot(mut self, snapshot: DateTime<Utc>) -> Self {
        self.access_snapshot = Some(snapshot);
        self
    }
}

/// Scope against which capability and role checks are evaluated.
///
/// Typically a course or other location in the host platform. Scopes form a
/// hierarchy owned by the [`Authority`](crate::traits::Authority).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationContext(pub String);

impl AuthorizationContext {
    /// Create a context from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the context identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AuthorizationContext {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A capability name such as `mod/quiz:view`.
///
/// Tokens taken from markup are sanitized by the filter before they reach
/// the authority. Tokens built here are used as given.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityToken(String);

impl CapabilityToken {
    /// Create a token from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the capability name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityToken {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Short name of a role, compared by exact, case-sensitive equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleShortname(String);

impl RoleShortname {
    /// Create a role shortname from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the shortname as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleShortname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleShortname {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// A role held by a viewer, with the context the assignment was made in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// The role's short name.
    pub shortname: RoleShortname,

    /// Context the role was assigned in. May be an ancestor of the queried one.
    pub context: AuthorizationContext,
}

impl RoleAssignment {
    /// Create a new role assignment.
    pub fn new(shortname: impl Into<RoleShortname>, context: impl Into<AuthorizationContext>) -> Self {
        Self {
            shortname: shortname.into(),
            context: context.into(),
        }
    }
}

/// Result of one filter invocation.
///
/// The text borrows the input when nothing was removed, so unaffected content
/// comes back byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOutput<'a> {
    /// The filtered text.
    pub text: Cow<'a, str>,

    /// Whether the text may be cached and served to other viewers.
    ///
    /// False whenever an element was removed, since the result then depends
    /// on who is looking.
    pub cacheable: bool,
}

impl<'a> FilterOutput<'a> {
    /// The input, returned untouched.
    pub fn unchanged(text: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            cacheable: true,
        }
    }

    /// Re-serialized text with at least one element removed.
    pub fn filtered(text: String) -> Self {
        Self {
            text: Cow::Owned(text),
            cacheable: false,
        }
    }

    /// Whether any element was removed.
    pub fn mutated(&self) -> bool {
        !self.cacheable
    }

    /// Take the text as an owned string.
    pub fn into_string(self) -> String {
        self.text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unchanged_output_borrows_input() {
        let input = "<p>hello</p>";
        let output = FilterOutput::unchanged(input);
        assert!(matches!(output.text, Cow::Borrowed(_)));
        assert!(output.cacheable);
        assert!(!output.mutated());
    }

    #[test]
    fn test_filtered_output_is_not_cacheable() {
        let output = FilterOutput::filtered("<p>Bye</p>".to_string());
        assert!(!output.cacheable);
        assert!(output.mutated());
        assert_eq!(output.into_string(), "<p>Bye</p>");
    }

    #[test]
    fn test_viewer_builder() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let viewer = Viewer::new(42u64).with_access_snapshot(at);
        assert_eq!(viewer.id.as_str(), "42");
        assert_eq!(viewer.access_snapshot, Some(at));
    }

    #[test]
    fn test_identifiers_serialize_transparently() {
        let context = AuthorizationContext::new("course-7");
        assert_eq!(serde_json::to_string(&context).unwrap(), "\"course-7\"");

        let role: RoleShortname = serde_json::from_str("\"editingteacher\"").unwrap();
        assert_eq!(role.as_str(), "editingteacher");
    }
}
