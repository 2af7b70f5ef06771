//! Tree acquisition.
//!
//! Turns source text into a tree-sitter tree. tree-sitter recovers from
//! malformed input instead of failing, so a tree containing ERROR or
//! MISSING nodes is reported as a `ParseFailure` at the first such node.
//! Python 2 statements and nesting too deep for the recursive walks are
//! rejected the same way.

pub mod language;
pub mod names;

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::ParseFailure;
pub use language::SupportedLanguage;

/// Parse Python source into a syntax tree.
pub fn parse_source(path: &Path, source: &str) -> Result<Tree, ParseFailure> {
    let failure = |line: usize, column: usize, message: String| ParseFailure {
        path: path.to_path_buf(),
        line,
        column,
        message,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&SupportedLanguage::Python.tree_sitter_language())
        .map_err(|e| failure(1, 1, format!("grammar unavailable: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| failure(1, 1, "parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if let Some((node, message)) = first_rejected(root) {
        let pos = node.start_position();
        return Err(failure(pos.row + 1, pos.column + 1, message));
    }
    if root.has_error() {
        return Err(failure(1, 1, "invalid syntax".to_string()));
    }

    Ok(tree)
}

/// Deepest nesting the walks accept, matching CPython's default
/// recursion limit.
pub const MAX_NESTING_DEPTH: usize = 1000;

/// First node, in document order, that makes the tree unacceptable:
/// an ERROR or MISSING node, a Python 2 `print`/`exec` statement, or
/// nesting past `MAX_NESTING_DEPTH`.
///
/// Iterative, so arbitrarily deep trees are safe to inspect.
fn first_rejected(root: Node) -> Option<(Node, String)> {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        let node = cursor.node();
        if let Some(message) = rejection(node, depth) {
            return Some((node, message));
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}

fn rejection(node: Node, depth: usize) -> Option<String> {
    if depth > MAX_NESTING_DEPTH {
        return Some("too many nested expressions (maximum recursion depth exceeded)".to_string());
    }
    if node.is_missing() {
        return Some(format!("missing '{}'", node.kind()));
    }
    if node.is_error() {
        return Some("invalid syntax".to_string());
    }
    match node.kind() {
        "print_statement" => Some("Missing parentheses in call to 'print'".to_string()),
        "exec_statement" => Some("Missing parentheses in call to 'exec'".to_string()),
        _ => None,
    }
}
