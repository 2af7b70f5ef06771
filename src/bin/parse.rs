//! catgraph-parse - per-file structural record.
//!
//! Usage:
//!   catgraph-parse <file.py>
//!
//! Prints the file record (or an `{error, module, file}` record for a
//! syntax error) as JSON on stdout and exits 0. A missing argument or an
//! unreadable file prints a JSON error on stderr and exits 1.

use catgraph::cli::{init_tracing, try_parse_args, ParseCli, PARSE_USAGE};
use catgraph::walk::record::parse_file;
use catgraph::CatgraphError;
use serde_json::json;

fn main() {
    init_tracing("warn");

    let Some(cli) = try_parse_args::<ParseCli>() else {
        eprintln!("{}", json!({ "error": PARSE_USAGE }));
        std::process::exit(1);
    };

    match parse_file(&cli.file) {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{}", json!({ "error": e.to_string() }));
                std::process::exit(1);
            }
        },
        Err(e) => {
            let message = match &e {
                CatgraphError::Read { path, source }
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    format!("File not found: {}", path.display())
                }
                CatgraphError::Read { path, source } => {
                    format!("Failed to read {}: {}", path.display(), source)
                }
                other => other.to_string(),
            };
            eprintln!("{}", json!({ "error": message }));
            std::process::exit(1);
        }
    }
}
