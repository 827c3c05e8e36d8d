//! Core traits that define the filter's seams.
//!
//! The [`Authority`] is the hosting platform's permission database as seen
//! by the filter. The [`TextFilter`] is how the host drives a filter while
//! rendering.

use std::sync::Arc;

use crate::error::{AuthorityError, Result};
use crate::types::{AuthorizationContext, CapabilityToken, FilterOutput, RoleAssignment, Viewer, ViewerId};

/// Read-only permission and role-membership lookups.
///
/// Implementations must be deterministic for the duration of one filter
/// invocation. Both calls are treated as idempotent and are never retried.
pub trait Authority: Send + Sync {
    /// Check whether the viewer holds a capability in a context.
    fn has_capability(
        &self,
        viewer: &ViewerId,
        capability: &CapabilityToken,
        context: &AuthorizationContext,
    ) -> std::result::Result<bool, AuthorityError>;

    /// Get every role assigned to the viewer in a context, including
    /// assignments inherited from ancestor contexts.
    fn assigned_roles(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
    ) -> std::result::Result<Vec<RoleAssignment>, AuthorityError>;
}

impl<A: Authority + ?Sized> Authority for &A {
    fn has_capability(
        &self,
        viewer: &ViewerId,
        capability: &CapabilityToken,
        context: &AuthorizationContext,
    ) -> std::result::Result<bool, AuthorityError> {
        (**self).has_capability(viewer, capability, context)
    }

    fn assigned_roles(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
    ) -> std::result::Result<Vec<RoleAssignment>, AuthorityError> {
        (**self).assigned_roles(viewer, context)
    }
}

impl<A: Authority + ?Sized> Authority for Arc<A> {
    fn has_capability(
        &self,
        viewer: &ViewerId,
        capability: &CapabilityToken,
        context: &AuthorizationContext,
    ) -> std::result::Result<bool, AuthorityError> {
        (**self).has_capability(viewer, capability, context)
    }

    fn assigned_roles(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
    ) -> std::result::Result<Vec<RoleAssignment>, AuthorityError> {
        (**self).assigned_roles(viewer, context)
    }
}

/// A filter a host applies to rendered text.
pub trait TextFilter: Send + Sync {
    /// Human-readable name of the filter.
    fn name(&self) -> &str;

    /// Filter a block of text for a viewer in a context.
    fn filter<'a>(
        &self,
        text: &'a str,
        viewer: &Viewer,
        context: &AuthorizationContext,
    ) -> Result<FilterOutput<'a>>;

    /// Cache key for output produced for this viewer.
    ///
    /// Output cached under one key must never be served under another.
    fn fingerprint(&self, viewer: &Viewer) -> String;
}
