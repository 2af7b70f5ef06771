//! Extractor configuration.
//!
//! Read from `CATGRAPH_CONFIG` when set, otherwise `<root>/catgraph.toml`.
//! A missing file yields the defaults; a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatgraphError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CATGRAPH_CONFIG";

/// Config file looked up in the scan root.
pub const CONFIG_FILE_NAME: &str = "catgraph.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Directory receiving `<name>-analysis.json` and `<name>-summary.txt`.
    pub output_dir: PathBuf,
    /// How many per-file failures the console report lists.
    pub error_preview: usize,
    /// Honour .gitignore / .ignore files during discovery.
    pub respect_gitignore: bool,
    /// Descend into hidden files and directories.
    pub include_hidden: bool,
    /// Directory names skipped during discovery (e.g. `.venv`).
    pub exclude_dirs: Vec<String>,
    /// Walk files on the rayon pool.
    pub parallel: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            error_preview: 5,
            respect_gitignore: false,
            include_hidden: true,
            exclude_dirs: Vec::new(),
            parallel: true,
        }
    }
}

impl ExtractorConfig {
    /// Load config from a TOML file, falling back to defaults if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CatgraphError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Self::from_toml(&content).map_err(|message| CatgraphError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Resolve the config for a scan root (env override first).
    pub fn for_root(root: &Path) -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
        Self::load(&path)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Whether a directory name is excluded from discovery.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }
}
