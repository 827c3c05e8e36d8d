//! The `fingerprint` command.

use multirole_core::ViewerId;

use super::parse_snapshot;
use crate::error::CliError;

pub fn execute(viewer: &str, snapshot: Option<&str>) -> Result<(), CliError> {
    let snapshot = parse_snapshot(snapshot)?;
    println!("{}", multirole_filter::fingerprint(&ViewerId::from(viewer), snapshot));
    Ok(())
}
