//! Structural walk over a parsed Python module.
//!
//! One depth-first traversal per file, dispatching on `SyntaxKind` and
//! threading the enclosing `Scope`. `graph` emits objects and morphisms
//! into a `GraphBuilder` (project shape); `record` builds the per-file
//! descriptive record (file shape).
//!
//! Both walks recurse per tree level; `parse_source` rejects trees deeper
//! than `parser::MAX_NESTING_DEPTH`, which bounds the recursion.

pub mod graph;
pub mod record;

use tree_sitter::Node;

use crate::parser::names::{dotted_name, node_text};

/// The node kinds the walk interprets. Everything else is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyntaxKind {
    ClassDefinition,
    FunctionDefinition,
    DecoratedDefinition,
    Import,
    ImportFrom,
    FutureImport,
    Call,
    Other,
}

impl SyntaxKind {
    pub(crate) fn of(node: Node) -> Self {
        match node.kind() {
            "class_definition" => SyntaxKind::ClassDefinition,
            "function_definition" => SyntaxKind::FunctionDefinition,
            "decorated_definition" => SyntaxKind::DecoratedDefinition,
            "import_statement" => SyntaxKind::Import,
            "import_from_statement" => SyntaxKind::ImportFrom,
            "future_import_statement" => SyntaxKind::FutureImport,
            "call" => SyntaxKind::Call,
            _ => SyntaxKind::Other,
        }
    }
}

/// Enclosing scope at the current point of the walk.
///
/// The project walk stores qualified ids in `class`/`function`, the file
/// walk stores plain names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub module: String,
    pub class: Option<String>,
    pub function: Option<String>,
}

impl Scope {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class: None,
            function: None,
        }
    }

    /// Innermost class if inside one, else the module.
    pub fn enclosing(&self) -> &str {
        self.class.as_deref().unwrap_or(&self.module)
    }

    pub fn in_class(&self, class: String) -> Self {
        Self {
            class: Some(class),
            ..self.clone()
        }
    }

    pub fn in_function(&self, function: String) -> Self {
        Self {
            function: Some(function),
            ..self.clone()
        }
    }
}

/// One name bound by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportedName {
    pub path: String,
    pub alias: Option<String>,
}

/// Names listed by `import a, b as c` or after `from m import`.
pub(crate) fn imported_names(stmt: Node, source: &[u8]) -> Vec<ImportedName> {
    let mut cursor = stmt.walk();
    let mut names: Vec<ImportedName> = stmt
        .children_by_field_name("name", &mut cursor)
        .filter_map(|child| {
            let path = dotted_name(child, source)?;
            let alias = (child.kind() == "aliased_import")
                .then(|| child.child_by_field_name("alias"))
                .flatten()
                .map(|a| node_text(a, source).to_string());
            Some(ImportedName { path, alias })
        })
        .collect();

    let mut cursor = stmt.walk();
    let wildcard = stmt
        .children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import");
    if wildcard {
        names.push(ImportedName {
            path: "*".to_string(),
            alias: None,
        });
    }
    names
}

/// Module of a from-import, with any relative-import dots dropped.
///
/// `from . import x` has no module and yields `None`.
pub(crate) fn from_import_module(stmt: Node, source: &[u8]) -> Option<String> {
    if SyntaxKind::of(stmt) == SyntaxKind::FutureImport {
        return Some("__future__".to_string());
    }
    let module = stmt.child_by_field_name("module_name")?;
    match module.kind() {
        "relative_import" => {
            let mut cursor = module.walk();
            let dotted = module
                .named_children(&mut cursor)
                .find(|c| c.kind() == "dotted_name");
            dotted_name(dotted?, source)
        }
        _ => dotted_name(module, source),
    }
}

/// Positional base-class expressions of a class definition.
///
/// Keyword arguments (`metaclass=...`) and `**kwargs` are not bases.
pub(crate) fn base_expressions(class: Node) -> Vec<Node> {
    let Some(superclasses) = class.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    let mut cursor = superclasses.walk();
    let bases = superclasses
        .named_children(&mut cursor)
        .filter(|c| {
            !matches!(
                c.kind(),
                "keyword_argument" | "dictionary_splat" | "comment"
            )
        })
        .collect();
    bases
}

/// Decorator expressions of a `decorated_definition`, in source order.
pub(crate) fn decorator_expressions(decorated: Node) -> Vec<Node> {
    let mut cursor = decorated.walk();
    let decorators: Vec<Node> = decorated
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .collect();
    decorators
        .into_iter()
        .filter_map(|d| {
            let mut cursor = d.walk();
            let expr = d
                .named_children(&mut cursor)
                .find(|c| c.kind() != "comment");
            expr
        })
        .collect()
}

/// Whether a `function_definition` is `async def`.
pub(crate) fn is_async(function: Node) -> bool {
    let mut cursor = function.walk();
    let first = function.children(&mut cursor).next();
    first.is_some_and(|c| c.kind() == "async")
}

/// 1-indexed start line.
pub(crate) fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

pub(crate) fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect();
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use std::path::Path;

    fn first_statement(source: &str, f: impl FnOnce(Node, &[u8])) {
        let tree = parse_source(Path::new("t.py"), source).unwrap();
        let stmt = tree.root_node().named_child(0).unwrap();
        f(stmt, source.as_bytes());
    }

    #[test]
    fn test_scope_enclosing() {
        let scope = Scope::new("pkg.mod");
        assert_eq!(scope.enclosing(), "pkg.mod");
        let inner = scope.in_class("pkg.mod.C".to_string());
        assert_eq!(inner.enclosing(), "pkg.mod.C");
        let func = inner.in_function("pkg.mod.C.m".to_string());
        assert_eq!(func.enclosing(), "pkg.mod.C");
        assert_eq!(func.function.as_deref(), Some("pkg.mod.C.m"));
    }

    #[test]
    fn test_imported_names() {
        first_statement("import os.path, numpy as np\n", |stmt, src| {
            let names = imported_names(stmt, src);
            assert_eq!(names.len(), 2);
            assert_eq!(names[0].path, "os.path");
            assert_eq!(names[0].alias, None);
            assert_eq!(names[1].path, "numpy");
            assert_eq!(names[1].alias.as_deref(), Some("np"));
        });
        first_statement("from pkg.sub import *\n", |stmt, src| {
            let names = imported_names(stmt, src);
            assert_eq!(names.len(), 1);
            assert_eq!(names[0].path, "*");
            assert_eq!(from_import_module(stmt, src).as_deref(), Some("pkg.sub"));
        });
    }

    #[test]
    fn test_relative_from_import_module() {
        first_statement("from .base import BaseService\n", |stmt, src| {
            assert_eq!(from_import_module(stmt, src).as_deref(), Some("base"));
        });
        first_statement("from . import sibling\n", |stmt, src| {
            assert_eq!(from_import_module(stmt, src), None);
        });
        first_statement("from __future__ import annotations\n", |stmt, src| {
            assert_eq!(SyntaxKind::of(stmt), SyntaxKind::FutureImport);
            assert_eq!(from_import_module(stmt, src).as_deref(), Some("__future__"));
        });
    }

    #[test]
    fn test_base_expressions_skip_keywords() {
        first_statement("class C(A, b.B, metaclass=Meta):\n    pass\n", |stmt, _| {
            let kinds: Vec<&str> = base_expressions(stmt).iter().map(|n| n.kind()).collect();
            assert_eq!(kinds, vec!["identifier", "attribute"]);
        });
    }

    #[test]
    fn test_async_detection() {
        first_statement("async def f():\n    pass\n", |stmt, _| assert!(is_async(stmt)));
        first_statement("def f():\n    pass\n", |stmt, _| assert!(!is_async(stmt)));
    }
}
