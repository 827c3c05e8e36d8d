//! multirole - filter HTML by the viewer's capabilities and roles.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use error::CliError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multirole")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Remove HTML the viewer lacks the capability or role to see", long_about = None)]
struct Cli {
    /// Sets the level of verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Filter configuration file (TOML or JSON)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter HTML for a viewer in a context
    Filter {
        /// Authority manifest with contexts, capabilities and roles (TOML or JSON)
        #[arg(short, long, value_name = "FILE")]
        grants: PathBuf,

        /// Viewer ID
        #[arg(long)]
        viewer: String,

        /// Authorization context ID
        #[arg(long)]
        context: String,

        /// Input file; stdin when omitted
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// When the viewer's access was last computed (RFC 3339)
        #[arg(long)]
        snapshot: Option<String>,

        /// Print text, cacheability and cache key as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the cache key for a viewer
    Fingerprint {
        /// Viewer ID
        #[arg(long)]
        viewer: String,

        /// When the viewer's access was last computed (RFC 3339)
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Report which filter markers appear in the input
    Scan {
        /// Input file; stdin when omitted
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Filter {
            grants,
            viewer,
            context,
            input,
            snapshot,
            json,
        } => {
            commands::filter::execute(commands::filter::FilterArgs {
                config: cli.config,
                grants,
                viewer,
                context,
                input,
                snapshot,
                json,
            })?;
        }
        Commands::Fingerprint { viewer, snapshot } => {
            commands::fingerprint::execute(&viewer, snapshot.as_deref())?;
        }
        Commands::Scan { input } => {
            commands::scan::execute(input)?;
        }
    }

    Ok(())
}
