//! Identifier construction.
//!
//! Every id in the graph is built here from plain strings, independent of
//! the syntax tree.

use std::path::{Component, Path};

use super::types::MorphismKind;

/// Prefix marking external import targets.
pub const IMPORT_PREFIX: &str = "import:";

/// Prefix of identity morphism ids.
pub const IDENTITY_PREFIX: &str = "id_";

const PYTHON_EXTENSION: &str = "py";
const PACKAGE_INIT_STEM: &str = "__init__";

/// `{scope}.{name}`, e.g. `pkg.module.ClassName.method`.
pub fn scoped_id(scope: &str, name: &str) -> String {
    format!("{scope}.{name}")
}

/// `import:{path}`.
pub fn import_id(path: &str) -> String {
    format!("{IMPORT_PREFIX}{path}")
}

/// `{type}:{source}->{target}`, unique per (type, source, target) triple.
pub fn morphism_id(kind: MorphismKind, source: &str, target: &str) -> String {
    format!("{kind}:{source}->{target}")
}

/// `id_{object}`.
pub fn identity_id(object_id: &str) -> String {
    format!("{IDENTITY_PREFIX}{object_id}")
}

/// Best-effort id for a base class expression.
///
/// Bare names are assumed to live in the current module; dotted names are
/// taken as already qualified. The result may not match any object.
pub fn qualify_base(module_id: &str, base: &str) -> Option<String> {
    if base.is_empty() {
        None
    } else if base.contains('.') {
        Some(base.to_string())
    } else {
        Some(scoped_id(module_id, base))
    }
}

/// Dotted module id for a file under a scan root.
///
/// `pkg/sub/mod.py` -> `pkg.sub.mod`, `pkg/__init__.py` -> `pkg`. Leading
/// dots are stripped, so `.venv/x.py` -> `venv.x`. A root level
/// `__init__.py` keeps `__init__` so the id is never empty. Files outside
/// the root fall back to their stem.
pub fn module_id_for_path(root: &Path, file: &Path) -> String {
    let relative = match file.strip_prefix(root) {
        Ok(relative) => relative,
        Err(_) => return file_stem(file),
    };

    let mut parts = normal_components(relative);
    match parts.last().map(String::as_str) {
        Some(last) if strip_py(last) == PACKAGE_INIT_STEM => {
            parts.pop();
        }
        Some(last) => {
            let stem = strip_py(last).to_string();
            if let Some(slot) = parts.last_mut() {
                *slot = stem;
            }
        }
        None => {}
    }

    let id = parts.join(".");
    match id.trim_start_matches('.') {
        "" => PACKAGE_INIT_STEM.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Dotted name for a file path given on its own (`tools/parse.py` -> `tools.parse`).
pub fn dotted_module_path(file: &Path) -> String {
    let mut parts = normal_components(file);
    if let Some(last) = parts.last_mut() {
        *last = strip_py(last).to_string();
    }
    parts.join(".")
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

fn strip_py(name: &str) -> &str {
    name.strip_suffix(PYTHON_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name)
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
