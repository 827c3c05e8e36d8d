//! Capability filtering.
//!
//! Removes every element whose `data-capability` names a capability the
//! viewer does not hold in the authorization context.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use multirole_core::error::Result;
use multirole_core::traits::Authority;
use multirole_core::types::{AuthorizationContext, CapabilityToken, ViewerId};

use crate::document::Document;
use crate::CAPABILITY_ATTRIBUTE;

lazy_static! {
    static ref DISALLOWED: Regex =
        Regex::new(r"[^A-Za-z0-9/:._-]").expect("capability pattern is valid");
}

/// Reduce a raw attribute value to a capability token.
///
/// Every character outside `[A-Za-z0-9/:._-]` is dropped, so a value such
/// as `type/m.od2:exa_m-ple<script>` becomes `type/m.od2:exa_m-ple`. A value
/// that reduces to nothing yields an empty token; the authority decides what
/// that means.
pub fn sanitize_capability(raw: &str) -> CapabilityToken {
    CapabilityToken::new(DISALLOWED.replace_all(raw, ""))
}

/// Remove elements requiring a capability the viewer lacks.
///
/// Elements with an empty `data-capability` carry no requirement and are
/// kept. Returns whether anything was removed.
pub fn filter_capabilities<A: Authority + ?Sized>(
    document: &Document,
    authority: &A,
    viewer: &ViewerId,
    context: &AuthorizationContext,
) -> Result<bool> {
    document.retain_elements(CAPABILITY_ATTRIBUTE, |raw| {
        if raw.is_empty() {
            return Ok(true);
        }

        let capability = sanitize_capability(raw);
        let granted = authority.has_capability(viewer, &capability, context)?;
        if !granted {
            debug!(
                capability = %capability,
                context = %context,
                "Removing element gated by missing capability"
            );
        }
        Ok(granted)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use multirole_core::config::ParseMode;
    use multirole_core::error::{AuthorityError, Error};
    use multirole_core::types::RoleAssignment;
    use parking_lot::Mutex;

    /// Grants a fixed list of capabilities and records every query.
    struct Grants {
        granted: Vec<&'static str>,
        asked: Mutex<Vec<String>>,
    }

    impl Grants {
        fn new(granted: Vec<&'static str>) -> Self {
            Self {
                granted,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    impl Authority for Grants {
        fn has_capability(
            &self,
            _viewer: &ViewerId,
            capability: &CapabilityToken,
            _context: &AuthorizationContext,
        ) -> std::result::Result<bool, AuthorityError> {
            self.asked.lock().push(capability.to_string());
            Ok(self.granted.contains(&capability.as_str()))
        }

        fn assigned_roles(
            &self,
            _viewer: &ViewerId,
            _context: &AuthorizationContext,
        ) -> std::result::Result<Vec<RoleAssignment>, AuthorityError> {
            Ok(Vec::new())
        }
    }

    struct Broken;

    impl Authority for Broken {
        fn has_capability(
            &self,
            _viewer: &ViewerId,
            _capability: &CapabilityToken,
            context: &AuthorizationContext,
        ) -> std::result::Result<bool, AuthorityError> {
            Err(AuthorityError::ContextNotFound(context.clone()))
        }

        fn assigned_roles(
            &self,
            _viewer: &ViewerId,
            _context: &AuthorizationContext,
        ) -> std::result::Result<Vec<RoleAssignment>, AuthorityError> {
            Ok(Vec::new())
        }
    }

    fn run(html: &str, authority: &dyn Authority) -> (bool, String) {
        let document = Document::parse(html, ParseMode::Fragment);
        let mutated = filter_capabilities(
            &document,
            authority,
            &ViewerId::from("7"),
            &AuthorizationContext::from("course-1"),
        )
        .unwrap();
        (mutated, document.serialize().unwrap())
    }

    #[test]
    fn test_sanitize_capability() {
        assert_eq!(
            sanitize_capability("type/m.od2:exa_m-ple<script>").as_str(),
            "type/m.od2:exa_m-ple"
        );
        assert_eq!(sanitize_capability("mod/quiz:view").as_str(), "mod/quiz:view");
        assert_eq!(sanitize_capability("a, b").as_str(), "ab");
        assert!(sanitize_capability("<>\"' ").is_empty());
    }

    #[test]
    fn test_removes_only_denied_elements() {
        let grants = Grants::new(vec!["mod/quiz:view"]);
        let (mutated, html) = run(
            r#"<p data-capability="mod/quiz:view">a</p><p data-capability="mod/quiz:grade">b</p><p>c</p>"#,
            &grants,
        );
        assert!(mutated);
        assert_eq!(html, r#"<p data-capability="mod/quiz:view">a</p><p>c</p>"#);
    }

    #[test]
    fn test_empty_value_is_no_requirement() {
        let grants = Grants::new(vec![]);
        let (mutated, _) = run(r#"<p data-capability="">a</p>"#, &grants);
        assert!(!mutated);
        assert!(grants.asked.lock().is_empty());
    }

    #[test]
    fn test_value_sanitizing_to_empty_is_still_checked() {
        let grants = Grants::new(vec![]);
        let (mutated, html) = run(r#"<p data-capability="<>">a</p><p>b</p>"#, &grants);
        assert!(mutated);
        assert_eq!(html, "<p>b</p>");
        assert_eq!(*grants.asked.lock(), vec![String::new()]);
    }

    #[test]
    fn test_sanitized_value_reaches_authority() {
        let grants = Grants::new(vec!["moodle/site:config"]);
        let (mutated, _) = run(
            r#"<div data-capability="moodle/site:config&quot;);">x</div>"#,
            &grants,
        );
        assert!(!mutated);
        assert_eq!(*grants.asked.lock(), vec!["moodle/site:config".to_string()]);
    }

    #[test]
    fn test_descendants_of_removed_element_are_not_checked() {
        let grants = Grants::new(vec![]);
        let (mutated, html) = run(
            r#"<div data-capability="outer"><span data-capability="inner">x</span></div>tail"#,
            &grants,
        );
        assert!(mutated);
        assert_eq!(html, "tail");
        assert_eq!(*grants.asked.lock(), vec!["outer".to_string()]);
    }

    #[test]
    fn test_gates_inside_template_are_checked() {
        let grants = Grants::new(vec![]);
        let (mutated, html) = run(
            r#"<template><div data-capability="mod/quiz:grade">SECRET</div></template><p>x</p>"#,
            &grants,
        );
        assert!(mutated);
        assert_eq!(html, "<template></template><p>x</p>");
        assert_eq!(*grants.asked.lock(), vec!["mod/quiz:grade".to_string()]);
    }

    #[test]
    fn test_authority_failure_propagates() {
        let document = Document::parse(r#"<p data-capability="x">a</p>"#, ParseMode::Fragment);
        let result = filter_capabilities(
            &document,
            &Broken,
            &ViewerId::from("7"),
            &AuthorizationContext::from("gone"),
        );
        assert!(matches!(
            result,
            Err(Error::Authority(AuthorityError::ContextNotFound(_)))
        ));
    }
}
