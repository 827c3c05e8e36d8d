//! Cache keys for filtered output.
//!
//! Filtered output depends on the viewer and on their permissions at the
//! time access was computed, so the key combines both. A changed access
//! snapshot gives a new key and invalidates anything cached under the old one.

use chrono::{DateTime, Utc};

use multirole_core::types::{Viewer, ViewerId};

/// Build the cache key for a viewer's access snapshot.
///
/// Without a recorded snapshot the current time stands in, which makes the
/// key differ from one second to the next.
pub fn fingerprint(viewer: &ViewerId, access_snapshot: Option<DateTime<Utc>>) -> String {
    let snapshot = access_snapshot.unwrap_or_else(Utc::now);
    format!(
        "MULTIROLE#{}#ACCESSDEFTIME#{}",
        viewer,
        snapshot.timestamp()
    )
}

/// Cache key for a [`Viewer`].
pub fn viewer_fingerprint(viewer: &Viewer) -> String {
    fingerprint(&viewer.id, viewer.access_snapshot)
}
