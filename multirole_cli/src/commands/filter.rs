//! The `filter` command.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use multirole_core::{AuthorizationContext, Viewer, ViewerId};
use multirole_filter::{InMemoryAuthority, MultiroleFilter};

use super::{load_manifest, parse_snapshot, read_input};
use crate::error::CliError;

/// Arguments of the `filter` command.
pub struct FilterArgs {
    pub config: Option<PathBuf>,
    pub grants: PathBuf,
    pub viewer: String,
    pub context: String,
    pub input: Option<PathBuf>,
    pub snapshot: Option<String>,
    pub json: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    text: &'a str,
    cacheable: bool,
    fingerprint: String,
}

pub fn execute(args: FilterArgs) -> Result<(), CliError> {
    let manifest = load_manifest(&args.grants)?;
    let authority = InMemoryAuthority::from_manifest(&manifest);
    let filter = match &args.config {
        Some(path) => MultiroleFilter::from_config_file(authority, path)?,
        None => MultiroleFilter::new(authority),
    };
    debug!(config = ?filter.config(), "Using filter config");

    let mut viewer = Viewer::new(ViewerId::new(args.viewer));
    if let Some(snapshot) = parse_snapshot(args.snapshot.as_deref())? {
        viewer = viewer.with_access_snapshot(snapshot);
    }
    let context = AuthorizationContext::new(args.context);

    let text = read_input(args.input.as_ref())?;
    let output = filter.filter(&text, &viewer, &context)?;

    if args.json {
        let json = JsonOutput {
            text: &output.text,
            cacheable: output.cacheable,
            fingerprint: filter.fingerprint(&viewer),
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", output.text);
        if output.mutated() {
            eprintln!("{}", "Content removed; output is viewer-specific".yellow());
        } else {
            eprintln!("{}", "Content unchanged; output is cacheable".green());
        }
    }

    Ok(())
}
