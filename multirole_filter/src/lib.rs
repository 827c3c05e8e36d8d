//! # Multirole Filter
//!
//! `multirole_filter` removes fragments of HTML that the current viewer is
//! not allowed to see. Elements opt in through two attributes:
//!
//! 1. **`data-capability`**: the viewer must hold the named capability in
//!    the authorization context.
//!
//! 2. **`data-role`**: the viewer must hold a role with this exact short name
//!    in the context or one of its ancestors.
//!
//! An element that fails its check is removed together with everything
//! inside it. Text without either attribute, or text in which every check
//! passes, is returned exactly as given and stays cacheable.
//!
//! ```
//! use multirole_core::{AuthorizationContext, Viewer};
//! use multirole_filter::{InMemoryAuthority, MultiroleFilter};
//!
//! let authority = InMemoryAuthority::new();
//! let context = AuthorizationContext::new("course-7");
//! let viewer = Viewer::new("42");
//! authority.assign_role(&viewer.id, &context, "editor");
//!
//! let filter = MultiroleFilter::new(authority);
//! let output = filter
//!     .filter(r#"<p data-role="student">Hi</p><p>Bye</p>"#, &viewer, &context)
//!     .unwrap();
//!
//! assert_eq!(output.text, "<p>Bye</p>");
//! assert!(!output.cacheable);
//! ```

pub mod capability;
pub mod document;
pub mod engine;
pub mod fingerprint;
pub mod role;
pub mod store;
pub mod trigger;

/// Attribute naming the capability an element requires.
pub const CAPABILITY_ATTRIBUTE: &str = "data-capability";

/// Attribute naming the role an element requires.
pub const ROLE_ATTRIBUTE: &str = "data-role";

// Re-export key types for convenience
pub use capability::sanitize_capability;
pub use document::Document;
pub use engine::MultiroleFilter;
pub use fingerprint::fingerprint;
pub use store::{AuthorityManifest, InMemoryAuthority};
pub use trigger::Markers;
