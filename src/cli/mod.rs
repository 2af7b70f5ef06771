//! Command-line surface shared by both binaries.
//!
//! - `catgraph <project_path> <project_name>`: whole-project graph
//! - `catgraph-parse <file.py>`: per-file record on stdout

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const PROJECT_USAGE: &str = "Usage: catgraph <project_path> <project_name>";
pub const PARSE_USAGE: &str = "Usage: catgraph-parse <file.py>";

#[derive(Parser, Debug)]
#[command(name = "catgraph")]
#[command(about = "Extract a categorical model (objects + morphisms) from a Python project")]
pub struct ProjectCli {
    /// Root directory to scan
    pub root: PathBuf,

    /// Project name, used for the graph name and artifact file names
    pub name: String,
}

#[derive(Parser, Debug)]
#[command(name = "catgraph-parse")]
#[command(about = "Emit the structural record of one Python file as JSON")]
pub struct ParseCli {
    /// Python source file
    pub file: PathBuf,
}

/// Parse `std::env::args`.
///
/// `--help` and `--version` print and exit as usual; any other argument
/// error yields `None` so the caller can print its one-line usage.
pub fn try_parse_args<T: Parser>() -> Option<T> {
    match T::try_parse() {
        Ok(cli) => Some(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => None,
    }
}

/// Structured logging to stderr, filtered by `RUST_LOG` or `default_level`.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
