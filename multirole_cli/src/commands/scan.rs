//! The `scan` command.

use std::path::PathBuf;

use colored::Colorize;
use multirole_filter::{Markers, CAPABILITY_ATTRIBUTE, ROLE_ATTRIBUTE};

use super::read_input;
use crate::error::CliError;

fn status(present: bool) -> colored::ColoredString {
    if present {
        "present".green()
    } else {
        "absent".dimmed()
    }
}

pub fn execute(input: Option<PathBuf>) -> Result<(), CliError> {
    let text = read_input(input.as_ref())?;
    let markers = Markers::detect(&text);

    println!("{}: {}", CAPABILITY_ATTRIBUTE, status(markers.capability));
    println!("{}: {}", ROLE_ATTRIBUTE, status(markers.role));
    Ok(())
}
