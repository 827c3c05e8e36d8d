//! In-memory authority.
//!
//! This module provides an [`Authority`] backed by in-process maps: a
//! context hierarchy, capability grants and role assignments per viewer and
//! context. Grants made in a context apply to all of its descendants.

use std::collections::{BTreeSet, HashSet};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use multirole_core::error::AuthorityError;
use multirole_core::traits::Authority;
use multirole_core::types::{AuthorizationContext, CapabilityToken, RoleAssignment, RoleShortname, ViewerId};

/// Capabilities and roles held by one viewer in one context.
#[derive(Clone, Debug, Default)]
struct ContextGrants {
    capabilities: BTreeSet<CapabilityToken>,
    roles: Vec<RoleShortname>,
}

/// Authority that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuthority {
    /// Parent of each context that has one.
    parents: DashMap<AuthorizationContext, AuthorizationContext>,

    /// Grants per viewer and context.
    grants: DashMap<(ViewerId, AuthorizationContext), RwLock<ContextGrants>>,
}

impl InMemoryAuthority {
    /// Create an empty authority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an authority from a manifest.
    pub fn from_manifest(manifest: &AuthorityManifest) -> Self {
        let authority = Self::new();

        for context in &manifest.contexts {
            if let Some(parent) = &context.parent {
                authority.set_parent(&context.id, parent);
            }
        }

        for grant in &manifest.grants {
            for capability in &grant.capabilities {
                authority.grant_capability(&grant.viewer, &grant.context, capability.clone());
            }
            for role in &grant.roles {
                authority.assign_role(&grant.viewer, &grant.context, role.clone());
            }
        }

        debug!(
            contexts = manifest.contexts.len(),
            grants = manifest.grants.len(),
            "Loaded authority manifest"
        );
        authority
    }

    /// Place a context below a parent context.
    pub fn set_parent(&self, child: &AuthorizationContext, parent: &AuthorizationContext) {
        self.parents.insert(child.clone(), parent.clone());
    }

    /// Grant a capability to a viewer in a context.
    pub fn grant_capability(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
        capability: impl Into<CapabilityToken>,
    ) {
        let entry = self
            .grants
            .entry((viewer.clone(), context.clone()))
            .or_default();
        entry.write().capabilities.insert(capability.into());
    }

    /// Assign a role to a viewer in a context.
    pub fn assign_role(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
        role: impl Into<RoleShortname>,
    ) {
        let role = role.into();
        let entry = self
            .grants
            .entry((viewer.clone(), context.clone()))
            .or_default();
        let mut grants = entry.write();
        if !grants.roles.contains(&role) {
            grants.roles.push(role);
        }
    }

    /// Remove a role assignment. Returns whether the role was assigned.
    pub fn unassign_role(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
        role: &RoleShortname,
    ) -> bool {
        match self.grants.get(&(viewer.clone(), context.clone())) {
            Some(entry) => {
                let mut grants = entry.write();
                let before = grants.roles.len();
                grants.roles.retain(|held| held != role);
                grants.roles.len() != before
            }
            None => false,
        }
    }

    /// The context followed by its ancestors, nearest first.
    ///
    /// Stops at the first repeated context so a cyclic hierarchy still ends.
    pub fn lineage(&self, context: &AuthorizationContext) -> Vec<AuthorizationContext> {
        let mut seen = HashSet::new();
        let mut lineage = Vec::new();
        let mut current = Some(context.clone());

        while let Some(ctx) = current {
            if !seen.insert(ctx.clone()) {
                break;
            }
            current = self.parents.get(&ctx).map(|parent| parent.value().clone());
            lineage.push(ctx);
        }

        lineage
    }
}

impl Authority for InMemoryAuthority {
    fn has_capability(
        &self,
        viewer: &ViewerId,
        capability: &CapabilityToken,
        context: &AuthorizationContext,
    ) -> Result<bool, AuthorityError> {
        let granted = self.lineage(context).into_iter().any(|ctx| {
            self.grants
                .get(&(viewer.clone(), ctx))
                .map(|entry| entry.read().capabilities.contains(capability))
                .unwrap_or(false)
        });
        Ok(granted)
    }

    fn assigned_roles(
        &self,
        viewer: &ViewerId,
        context: &AuthorizationContext,
    ) -> Result<Vec<RoleAssignment>, AuthorityError> {
        let mut seen = HashSet::new();
        let mut assignments = Vec::new();

        for ctx in self.lineage(context) {
            if let Some(entry) = self.grants.get(&(viewer.clone(), ctx.clone())) {
                for role in &entry.read().roles {
                    if seen.insert(role.clone()) {
                        assignments.push(RoleAssignment::new(role.clone(), ctx.clone()));
                    }
                }
            }
        }

        Ok(assignments)
    }
}

/// Serializable description of an [`InMemoryAuthority`].
///
/// ```toml
/// [[contexts]]
/// id = "course-7"
/// parent = "category-1"
///
/// [[grants]]
/// viewer = "42"
/// context = "course-7"
/// capabilities = ["mod/quiz:view"]
/// roles = ["student"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityManifest {
    /// Context hierarchy.
    #[serde(default)]
    pub contexts: Vec<ContextEntry>,

    /// Grants per viewer and context.
    #[serde(default)]
    pub grants: Vec<GrantEntry>,
}

impl AuthorityManifest {
    /// Parse a manifest from TOML.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse a manifest from JSON.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// A context and its parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub id: AuthorizationContext,
    #[serde(default)]
    pub parent: Option<AuthorizationContext>,
}

/// What a viewer holds in one context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    pub viewer: ViewerId,
    pub context: AuthorizationContext,
    #[serde(default)]
    pub capabilities: Vec<CapabilityToken>,
    #[serde(default)]
    pub roles: Vec<RoleShortname>,
}
