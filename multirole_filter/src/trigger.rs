//! Trigger detection.
//!
//! A cheap scan over the raw text decides whether parsing is needed at all.
//! The scan over-approximates: a marker inside a comment or a text node
//! still triggers, which only costs a wasted parse.

use lazy_static::lazy_static;
use regex::RegexSet;

lazy_static! {
    static ref MARKERS: RegexSet = RegexSet::new([
        r"(?i)data-capability",
        r"(?i)data-role",
    ])
    .expect("marker patterns are valid");
}

const CAPABILITY: usize = 0;
const ROLE: usize = 1;

/// Which filter attributes may be present in a text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Markers {
    /// `data-capability` appears somewhere in the text.
    pub capability: bool,

    /// `data-role` appears somewhere in the text.
    pub role: bool,
}

impl Markers {
    /// Neither marker.
    pub const NONE: Markers = Markers {
        capability: false,
        role: false,
    };

    /// Scan text for the filter markers, ignoring ASCII case.
    pub fn detect(text: &str) -> Self {
        if text.is_empty() {
            return Self::NONE;
        }

        let matches = MARKERS.matches(text);
        Self {
            capability: matches.matched(CAPABILITY),
            role: matches.matched(ROLE),
        }
    }

    /// Whether either marker is present.
    pub fn any(&self) -> bool {
        self.capability || self.role
    }

    /// Keep only the markers whose filters are enabled.
    pub fn restrict(self, capability_filter: bool, role_filter: bool) -> Self {
        Self {
            capability: self.capability && capability_filter,
            role: self.role && role_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_marker() {
        let markers = Markers::detect(r#"<div data-capability="mod/quiz:view">x</div>"#);
        assert!(markers.capability);
        assert!(!markers.role);

        let markers = Markers::detect(r#"<div data-role="student">x</div>"#);
        assert!(!markers.capability);
        assert!(markers.role);
    }

    #[test]
    fn test_detection_ignores_case() {
        let markers = Markers::detect(r#"<DIV DATA-ROLE="x" Data-Capability="y"></DIV>"#);
        assert!(markers.capability);
        assert!(markers.role);
    }

    #[test]
    fn test_trivial_input_has_no_markers() {
        assert_eq!(Markers::detect(""), Markers::NONE);
        assert_eq!(Markers::detect("0"), Markers::NONE);
        assert_eq!(Markers::detect("12345"), Markers::NONE);
    }

    #[test]
    fn test_markers_found_without_markup() {
        let markers = Markers::detect("plain data-role text");
        assert!(markers.role);
        assert!(!markers.capability);
    }

    #[test]
    fn test_marker_in_text_node_still_triggers() {
        let markers = Markers::detect("<p>Use the data-role attribute</p>");
        assert!(markers.role);
        assert!(markers.any());
    }

    #[test]
    fn test_restrict_drops_disabled_filters() {
        let markers = Markers {
            capability: true,
            role: true,
        };
        assert_eq!(
            markers.restrict(false, true),
            Markers {
                capability: false,
                role: true
            }
        );
        assert!(!markers.restrict(false, false).any());
    }
}
