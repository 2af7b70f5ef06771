//! Error types for catgraph.
//!
//! Read failures are fatal to the invocation that hit them. Parse failures
//! are isolated per file: the project extractor records them and moves on,
//! the per-file extractor turns them into an error record.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for the catgraph library.
#[derive(Debug, Error)]
pub enum CatgraphError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatgraphError>;

/// Malformed source in a single file.
///
/// Carries a position and a human-readable message only; the syntax tree
/// that produced it is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub path: PathBuf,
    /// 1-indexed line of the first syntax error.
    pub line: usize,
    /// 1-indexed column of the first syntax error.
    pub column: usize,
    pub message: String,
}

impl ParseFailure {
    /// Diagnostic without the path prefix, e.g. `invalid syntax (line 3, column 7)`.
    pub fn diagnostic(&self) -> String {
        format!("{} (line {}, column {})", self.message, self.line, self.column)
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.diagnostic())
    }
}

impl std::error::Error for ParseFailure {}
