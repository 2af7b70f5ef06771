//! Run artifacts: the graph document, the text summary and the console report.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::graph::stats::RULE;
use crate::graph::{Graph, ProjectExtraction};

/// Paths of the two files written per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub analysis: PathBuf,
    pub summary: PathBuf,
}

pub fn analysis_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{name}-analysis.json"))
}

pub fn summary_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{name}-summary.txt"))
}

/// Write the graph as 2-space indented JSON.
pub fn write_graph(graph: &Graph, path: &Path) -> Result<()> {
    let json = graph.to_json_pretty()?;
    fs::write(path, json)?;
    Ok(())
}

pub fn summary_text(root: &Path, extraction: &ProjectExtraction) -> String {
    let stats = &extraction.stats;
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "  Categorical Code Analysis Summary");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Project: {}", root.display());
    let _ = writeln!(out, "Python Files: {}", extraction.file_count);
    let _ = writeln!(out);
    let _ = writeln!(out, "Objects: {}", stats.object_count);
    let _ = writeln!(out, "Morphisms: {}", stats.morphism_count);
    if let Some(ratio) = stats.ratio() {
        let _ = writeln!(out, "Ratio: {ratio:.2} morphisms per object");
    }
    out
}

pub fn write_summary(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    Ok(())
}

/// Statistics block followed by the error count and at most `preview`
/// failures.
pub fn console_report(extraction: &ProjectExtraction, preview: usize) -> String {
    let mut out = extraction.stats.to_string();
    let _ = writeln!(out);
    let _ = writeln!(out, "Errors: {}", extraction.errors.len());
    for failure in extraction.errors.iter().take(preview) {
        let _ = writeln!(out, "    {failure}");
    }
    let hidden = extraction.errors.len().saturating_sub(preview);
    if hidden > 0 {
        let _ = writeln!(out, "    ... and {hidden} more");
    }
    out
}

/// Write `<name>-analysis.json` and `<name>-summary.txt` into `output_dir`.
pub fn write_artifacts(
    extraction: &ProjectExtraction,
    root: &Path,
    name: &str,
    output_dir: &Path,
) -> Result<Artifacts> {
    fs::create_dir_all(output_dir)?;
    let artifacts = Artifacts {
        analysis: analysis_path(output_dir, name),
        summary: summary_path(output_dir, name),
    };
    write_graph(&extraction.graph, &artifacts.analysis)?;
    write_summary(&artifacts.summary, &summary_text(root, extraction))?;
    info!(
        analysis = %artifacts.analysis.display(),
        summary = %artifacts.summary.display(),
        "artifacts written"
    );
    Ok(artifacts)
}
