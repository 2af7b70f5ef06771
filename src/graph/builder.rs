//! Project builder: scans a directory and builds the categorical graph.
//!
//! Walks `*.py` files under the root, parses each with tree-sitter on the
//! rayon pool into its own `GraphBuilder`, then merges the per-file
//! builders serially in sorted path order and adds identity morphisms.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::engine::GraphBuilder;
use super::stats::GraphStats;
use super::types::Graph;
use crate::config::ExtractorConfig;
use crate::error::{CatgraphError, Result};
use crate::parser::SupportedLanguage;
use crate::walk::graph::extract_module_graph;

/// One file that contributed nothing to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Result of a whole-project run.
#[derive(Debug, Clone)]
pub struct ProjectExtraction {
    pub graph: Graph,
    pub stats: GraphStats,
    /// Python files discovered, including the ones that failed.
    pub file_count: usize,
    /// Per-file failures, in path order.
    pub errors: Vec<FileFailure>,
}

/// Find every Python file under `root`, sorted by path.
pub fn discover_python_files(root: &Path, config: &ExtractorConfig) -> Vec<PathBuf> {
    let excluded = config.clone();
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(!config.include_hidden)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .parents(config.respect_gitignore)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry.depth() == 0
                || !is_dir
                || !excluded.is_excluded_dir(&entry.file_name().to_string_lossy())
        })
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| SupportedLanguage::from_path(entry.path()).is_some())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Build the graph for every Python file under `root`.
///
/// Per-file read and parse failures are collected, never fatal. Only a
/// missing or unreadable root is an error.
pub fn extract_project(
    root: &Path,
    name: &str,
    config: &ExtractorConfig,
) -> Result<ProjectExtraction> {
    let meta = fs::metadata(root).map_err(|e| CatgraphError::Read {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !meta.is_dir() {
        return Err(CatgraphError::Read {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let files = discover_python_files(root, config);
    info!(root = %root.display(), files = files.len(), "extracting project");

    let results: Vec<std::result::Result<GraphBuilder, FileFailure>> = if config.parallel {
        files.par_iter().map(|path| extract_file(root, path)).collect()
    } else {
        files.iter().map(|path| extract_file(root, path)).collect()
    };

    let mut merged = GraphBuilder::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(builder) => merged.absorb(builder),
            Err(failure) => {
                warn!(path = %failure.path.display(), error = %failure.message, "file skipped");
                errors.push(failure);
            }
        }
    }

    let graph = merged.finish(name);
    let stats = GraphStats::from_graph(&graph);
    info!(
        objects = stats.object_count,
        morphisms = stats.morphism_count,
        errors = errors.len(),
        "extraction complete"
    );

    Ok(ProjectExtraction {
        graph,
        stats,
        file_count: files.len(),
        errors,
    })
}

fn extract_file(root: &Path, path: &Path) -> std::result::Result<GraphBuilder, FileFailure> {
    debug!(path = %path.display(), "walking file");
    let source = fs::read_to_string(path).map_err(|e| FileFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    extract_module_graph(root, path, &source).map_err(|failure| FileFailure {
        path: path.to_path_buf(),
        message: failure.diagnostic(),
    })
}
