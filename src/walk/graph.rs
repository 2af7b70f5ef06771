//! Project-shape walk: emits objects and morphisms for one module.

use std::path::Path;

use serde_json::{json, Value};
use tracing::trace;
use tree_sitter::Node;

use super::{
    base_expressions, children, from_import_module, imported_names, is_async, line_of, Scope,
    SyntaxKind,
};
use crate::error::ParseFailure;
use crate::graph::engine::GraphBuilder;
use crate::graph::ids::{import_id, module_id_for_path, qualify_base, scoped_id};
use crate::graph::types::{Metadata, MorphismKind, Object, ObjectKind};
use crate::parser::names::{field_text, resolve_name};
use crate::parser::{parse_source, SupportedLanguage};

/// Parse one file and walk it into a fresh builder.
///
/// The module object is keyed by the file's dotted path under `root`.
pub fn extract_module_graph(
    root: &Path,
    path: &Path,
    source: &str,
) -> Result<GraphBuilder, ParseFailure> {
    let tree = parse_source(path, source)?;
    let module_id = module_id_for_path(root, path);
    let relative = path.strip_prefix(root).unwrap_or(path);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| module_id.clone());

    let mut builder = GraphBuilder::new();
    let mut walker = GraphWalker::new(source.as_bytes(), &mut builder);
    walker.add_module(&module_id, name, &relative.to_string_lossy());
    walker.visit(tree.root_node(), &Scope::new(module_id));
    Ok(builder)
}

/// Emits into a borrowed builder while descending the tree.
pub struct GraphWalker<'a> {
    source: &'a [u8],
    builder: &'a mut GraphBuilder,
    language: &'static str,
}

impl<'a> GraphWalker<'a> {
    pub fn new(source: &'a [u8], builder: &'a mut GraphBuilder) -> Self {
        Self {
            source,
            builder,
            language: SupportedLanguage::Python.tag(),
        }
    }

    pub fn add_module(&mut self, module_id: &str, name: String, file: &str) {
        let metadata = self.metadata([("file", json!(file))]);
        self.builder.add_object(Object::new(
            module_id.to_string(),
            ObjectKind::Module,
            name,
            metadata,
        ));
    }

    pub fn visit(&mut self, node: Node, scope: &Scope) {
        match SyntaxKind::of(node) {
            SyntaxKind::ClassDefinition => self.visit_class(node, scope),
            SyntaxKind::FunctionDefinition => self.visit_function(node, scope),
            SyntaxKind::Import => self.visit_import(node, scope),
            SyntaxKind::ImportFrom | SyntaxKind::FutureImport => self.visit_from_import(node, scope),
            _ => self.visit_children(node, scope),
        }
    }

    fn visit_children(&mut self, node: Node, scope: &Scope) {
        for child in children(node) {
            self.visit(child, scope);
        }
    }

    fn visit_class(&mut self, node: Node, scope: &Scope) {
        let Some(name) = field_text(node, "name", self.source) else {
            return self.visit_children(node, scope);
        };
        let class_id = scoped_id(scope.enclosing(), &name);
        let bases: Vec<String> = base_expressions(node)
            .into_iter()
            .map(|base| resolve_name(base, self.source).unwrap_or_default())
            .collect();

        let metadata = self.metadata([
            ("module", json!(scope.module)),
            ("line", json!(line_of(node))),
            ("bases", json!(bases)),
        ]);
        self.builder
            .add_object(Object::new(class_id.clone(), ObjectKind::Class, name, metadata));
        self.builder
            .add_morphism(MorphismKind::Defines, scope.enclosing(), &class_id);

        for base in &bases {
            if let Some(base_id) = qualify_base(&scope.module, base) {
                self.builder
                    .add_morphism(MorphismKind::Inheritance, &class_id, &base_id);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, &scope.in_class(class_id));
        }
    }

    fn visit_function(&mut self, node: Node, scope: &Scope) {
        let Some(name) = field_text(node, "name", self.source) else {
            return self.visit_children(node, scope);
        };
        let parent = scope.enclosing().to_string();
        let function_id = scoped_id(&parent, &name);

        let mut metadata = self.metadata([
            ("module", json!(scope.module)),
            ("line", json!(line_of(node))),
        ]);
        if is_async(node) {
            metadata.insert("async".to_string(), json!(true));
        }
        self.builder.add_object(Object::new(
            function_id.clone(),
            ObjectKind::Function,
            name,
            metadata,
        ));
        self.builder
            .add_morphism(MorphismKind::Defines, &parent, &function_id);

        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, &scope.in_function(function_id));
        }
    }

    fn visit_import(&mut self, node: Node, scope: &Scope) {
        for imported in imported_names(node, self.source) {
            self.add_import(&scope.module, &imported.path);
        }
    }

    /// One morphism per statement, to the module; imported names are ignored.
    fn visit_from_import(&mut self, node: Node, scope: &Scope) {
        match from_import_module(node, self.source) {
            Some(module) => self.add_import(&scope.module, &module),
            None => trace!(line = line_of(node), "from-import without module, skipped"),
        }
    }

    fn add_import(&mut self, module_id: &str, path: &str) {
        let target = import_id(path);
        let metadata = self.metadata([]);
        self.builder.add_object(Object::new(
            target.clone(),
            ObjectKind::ImportedModule,
            path.to_string(),
            metadata,
        ));
        self.builder
            .add_morphism(MorphismKind::Import, module_id, &target);
    }

    fn metadata<const N: usize>(&self, entries: [(&str, Value); N]) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("language".to_string(), json!(self.language));
        for (key, value) in entries {
            metadata.insert(key.to_string(), value);
        }
        metadata
    }
}
