//! Role filtering.
//!
//! Removes every element whose `data-role` names a role the viewer does not
//! hold in the authorization context or any of its ancestors.

use std::collections::HashSet;

use tracing::debug;

use multirole_core::error::Result;
use multirole_core::traits::Authority;
use multirole_core::types::{AuthorizationContext, ViewerId};

use crate::document::Document;
use crate::ROLE_ATTRIBUTE;

/// Short names of every role the viewer holds in a context.
///
/// One authority call, made once per filter invocation.
pub fn assigned_shortnames<A: Authority + ?Sized>(
    authority: &A,
    viewer: &ViewerId,
    context: &AuthorizationContext,
) -> Result<HashSet<String>> {
    let roles = authority.assigned_roles(viewer, context)?;
    Ok(roles
        .into_iter()
        .map(|assignment| assignment.shortname.as_str().to_string())
        .collect())
}

/// Remove elements requiring a role the viewer lacks.
///
/// The attribute value is compared verbatim and case-sensitively. Elements
/// with an empty `data-role` are kept. Returns whether anything was removed.
pub fn filter_roles<A: Authority + ?Sized>(
    document: &Document,
    authority: &A,
    viewer: &ViewerId,
    context: &AuthorizationContext,
) -> Result<bool> {
    let shortnames = assigned_shortnames(authority, viewer, context)?;
    debug!(roles = shortnames.len(), context = %context, "Resolved viewer roles");

    document.retain_elements(ROLE_ATTRIBUTE, |role| {
        if role.is_empty() || shortnames.contains(role) {
            return Ok(true);
        }
        debug!(role = %role, context = %context, "Removing element gated by missing role");
        Ok(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use multirole_core::config::ParseMode;
    use multirole_core::error::AuthorityError;
    use multirole_core::types::{CapabilityToken, RoleAssignment};

    /// Holds a fixed set of roles and counts role lookups.
    struct Roles {
        held: Vec<&'static str>,
        lookups: AtomicUsize,
    }

    impl Roles {
        fn new(held: Vec<&'static str>) -> Self {
            Self {
                held,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl Authority for Roles {
        fn has_capability(
            &self,
            _viewer: &ViewerId,
            _capability: &CapabilityToken,
            _context: &AuthorizationContext,
        ) -> std::result::Result<bool, AuthorityError> {
            Ok(false)
        }

        fn assigned_roles(
            &self,
            _viewer: &ViewerId,
            context: &AuthorizationContext,
        ) -> std::result::Result<Vec<RoleAssignment>, AuthorityError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .held
                .iter()
                .map(|name| RoleAssignment::new(*name, context.clone()))
                .collect())
        }
    }

    fn run(html: &str, roles: &Roles) -> (bool, String) {
        let document = Document::parse(html, ParseMode::Fragment);
        let mutated = filter_roles(
            &document,
            roles,
            &ViewerId::from("7"),
            &AuthorizationContext::from("course-1"),
        )
        .unwrap();
        (mutated, document.serialize().unwrap())
    }

    #[test]
    fn test_removes_element_for_missing_role() {
        let roles = Roles::new(vec!["editor"]);
        let (mutated, html) = run(r#"<p data-role="student">Hi</p><p>Bye</p>"#, &roles);
        assert!(mutated);
        assert_eq!(html, "<p>Bye</p>");
    }

    #[test]
    fn test_role_match_is_case_sensitive() {
        let roles = Roles::new(vec!["Teacher"]);
        let (mutated, html) = run(r#"<p data-role="teacher">x</p><p data-role="Teacher">y</p>"#, &roles);
        assert!(mutated);
        assert_eq!(html, r#"<p data-role="Teacher">y</p>"#);
    }

    #[test]
    fn test_value_is_not_trimmed() {
        let roles = Roles::new(vec!["student"]);
        let (mutated, html) = run(r#"<p data-role=" student">x</p>"#, &roles);
        assert!(mutated);
        assert_eq!(html, "");
    }

    #[test]
    fn test_empty_value_is_no_requirement() {
        let roles = Roles::new(vec![]);
        let (mutated, _) = run(r#"<p data-role="">x</p><p data-role>y</p>"#, &roles);
        assert!(!mutated);
    }

    #[test]
    fn test_roles_resolved_once_per_invocation() {
        let roles = Roles::new(vec!["student"]);
        let (mutated, _) = run(
            r#"<p data-role="student">a</p><p data-role="student">b</p><p data-role="student">c</p>"#,
            &roles,
        );
        assert!(!mutated);
        assert_eq!(roles.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nested_gates_removed_with_parent() {
        let roles = Roles::new(vec!["student"]);
        let (mutated, html) = run(
            r#"<section data-role="manager"><p data-role="student">a</p></section><p data-role="student">b</p>"#,
            &roles,
        );
        assert!(mutated);
        assert_eq!(html, r#"<p data-role="student">b</p>"#);
    }

    #[test]
    fn test_gates_inside_noscript_are_checked() {
        let roles = Roles::new(vec!["student"]);
        let (mutated, html) = run(
            r#"<noscript><div data-role="teacher">SECRET</div>fallback</noscript>"#,
            &roles,
        );
        assert!(mutated);
        assert_eq!(html, "<noscript>fallback</noscript>");
    }
}
