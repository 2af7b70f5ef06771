//! Language detection and tree-sitter grammar loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Language;

/// Languages the extractor can walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedLanguage {
    Python,
}

impl SupportedLanguage {
    /// Detect language from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "py" => Some(SupportedLanguage::Python),
            _ => None,
        }
    }

    /// Get the tree-sitter Language for this language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SupportedLanguage::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Tag written into object metadata (`"language": "python"`).
    pub fn tag(&self) -> &'static str {
        match self {
            SupportedLanguage::Python => "python",
        }
    }
}
