//! Filter orchestration.
//!
//! Runs the trigger scan, parses at most once, applies the capability
//! filter and then the role filter, and serializes only when something was
//! removed.

use std::path::Path;

use tracing::{debug_span, trace};
use uuid::Uuid;

use multirole_core::config::{load_config, FilterConfig};
use multirole_core::error::Result;
use multirole_core::traits::{Authority, TextFilter};
use multirole_core::types::{AuthorizationContext, FilterOutput, Viewer};

use crate::capability::filter_capabilities;
use crate::document::Document;
use crate::fingerprint::viewer_fingerprint;
use crate::role::filter_roles;
use crate::trigger::Markers;

/// Name the filter reports to hosts.
pub const FILTER_NAME: &str = "Multiple-role Content";

/// The multirole content filter.
///
/// Holds the authority it queries and its configuration. Every invocation
/// builds and drops its own document, so one filter may serve concurrent
/// requests when the authority allows it.
#[derive(Clone, Debug)]
pub struct MultiroleFilter<A> {
    /// The authorization collaborator.
    authority: A,

    /// Filter configuration.
    config: FilterConfig,
}

impl<A: Authority> MultiroleFilter<A> {
    /// Create a filter with the default configuration.
    pub fn new(authority: A) -> Self {
        Self::with_config(authority, FilterConfig::default())
    }

    /// Create a filter with an explicit configuration.
    pub fn with_config(authority: A, config: FilterConfig) -> Self {
        Self { authority, config }
    }

    /// Create a filter with configuration loaded from a TOML or JSON file.
    pub fn from_config_file(authority: A, path: &Path) -> Result<Self> {
        let config = load_config(path)?;
        Ok(Self::with_config(authority, config))
    }

    /// Get the authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Get the configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filter text for a viewer in a context.
    ///
    /// The input comes back untouched, and cacheable, unless at least one
    /// gated element failed its check. An authority error aborts the whole
    /// invocation; no partially filtered text is returned.
    pub fn filter<'a>(
        &self,
        text: &'a str,
        viewer: &Viewer,
        context: &AuthorizationContext,
    ) -> Result<FilterOutput<'a>> {
        // No element can exist without a tag.
        if text.is_empty() || !text.contains('<') {
            return Ok(FilterOutput::unchanged(text));
        }

        let markers = Markers::detect(text)
            .restrict(self.config.capability_filter, self.config.role_filter);
        if !markers.any() {
            trace!("No filter markers present");
            return Ok(FilterOutput::unchanged(text));
        }

        let span = debug_span!(
            "multirole_filter",
            request_id = %Uuid::new_v4(),
            viewer = %viewer.id,
            context = %context,
        );
        let _guard = span.enter();

        let document = Document::parse(text, self.config.parse_mode);

        let mut mutated = false;
        if markers.capability {
            mutated |= filter_capabilities(&document, &self.authority, &viewer.id, context)?;
        }
        if markers.role {
            mutated |= filter_roles(&document, &self.authority, &viewer.id, context)?;
        }

        if !mutated {
            trace!("Every gated element passed");
            return Ok(FilterOutput::unchanged(text));
        }

        Ok(FilterOutput::filtered(document.serialize()?))
    }

    /// Cache key for output produced for a viewer.
    pub fn fingerprint(&self, viewer: &Viewer) -> String {
        viewer_fingerprint(viewer)
    }
}

impl<A: Authority> TextFilter for MultiroleFilter<A> {
    fn name(&self) -> &str {
        FILTER_NAME
    }

    fn filter<'a>(
        &self,
        text: &'a str,
        viewer: &Viewer,
        context: &AuthorizationContext,
    ) -> Result<FilterOutput<'a>> {
        MultiroleFilter::filter(self, text, viewer, context)
    }

    fn fingerprint(&self, viewer: &Viewer) -> String {
        MultiroleFilter::fingerprint(self, viewer)
    }
}
