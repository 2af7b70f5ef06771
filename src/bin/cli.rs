//! catgraph - whole-project categorical extraction.
//!
//! Usage:
//!   catgraph <project_path> <project_name>
//!
//! Writes `<project_name>-analysis.json` and `<project_name>-summary.txt`
//! into the configured output directory (default: current directory).

use anyhow::{bail, Context, Result};
use catgraph::cli::{init_tracing, try_parse_args, ProjectCli, PROJECT_USAGE};
use catgraph::output::{console_report, write_artifacts};
use catgraph::{extract_project, ExtractorConfig};

fn main() {
    init_tracing("info");

    let Some(cli) = try_parse_args::<ProjectCli>() else {
        eprintln!("{PROJECT_USAGE}");
        std::process::exit(1);
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: ProjectCli) -> Result<()> {
    if !cli.root.exists() {
        bail!("Path does not exist: {}", cli.root.display());
    }
    let config = ExtractorConfig::for_root(&cli.root).context("loading configuration")?;

    println!("Analyzing: {}", cli.root.display());
    println!("Project: {}\n", cli.name);

    let extraction = extract_project(&cli.root, &cli.name, &config)
        .with_context(|| format!("extracting {}", cli.root.display()))?;
    println!("Python Files Found: {}\n", extraction.file_count);
    print!("{}", console_report(&extraction, config.error_preview));

    let artifacts = write_artifacts(&extraction, &cli.root, &cli.name, &config.output_dir)
        .context("writing artifacts")?;
    println!("\nExported graph: {}", artifacts.analysis.display());
    println!("Summary saved to: {}", artifacts.summary.display());
    Ok(())
}
