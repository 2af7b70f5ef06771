//! File-shape walk: a descriptive record of one file.
//!
//! Unlike the project walk this creates no objects or morphisms. Imports,
//! classes, functions and call sites are reported as raw facts for an
//! external process to fold into a graph.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use tree_sitter::Node;

use super::{
    base_expressions, children, decorator_expressions, from_import_module, imported_names,
    is_async, line_of, Scope, SyntaxKind,
};
use crate::error::{CatgraphError, Result};
use crate::graph::ids::dotted_module_path;
use crate::parser::names::{docstring, field_text, node_text, resolve_name};
use crate::parser::parse_source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import X`
    Import,
    /// `from M import X`
    FromImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(rename = "type")]
    pub kind: ImportKind,
    /// Source module of a from-import; absent for plain imports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub name: String,
    pub asname: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub type_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub parameters: Vec<ParameterRecord>,
    pub return_type: Option<String>,
    pub decorators: Vec<String>,
    pub line: usize,
    pub is_method: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub methods: Vec<FunctionRecord>,
    pub line: usize,
    pub docstring: Option<String>,
}

/// A call site, by callee text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub func: String,
    pub line: usize,
    pub context_class: Option<String>,
    pub context_function: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub module: String,
    pub file: String,
    pub imports: Vec<ImportRecord>,
    pub classes: Vec<ClassRecord>,
    pub functions: Vec<FunctionRecord>,
    pub calls: Vec<CallRecord>,
}

/// Emitted instead of a `FileRecord` when the file does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    pub module: String,
    pub file: String,
}

/// Result of the per-file extractor. Always well-formed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Parsed(FileRecord),
    Failed(ErrorRecord),
}

impl FileOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

/// Read and extract one file. Only an unreadable path is an `Err`.
pub fn parse_file(path: &Path) -> Result<FileOutcome> {
    let source = fs::read_to_string(path).map_err(|e| CatgraphError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(extract_record(path, &source))
}

/// Extract the per-file record from source text.
pub fn extract_record(path: &Path, source: &str) -> FileOutcome {
    let file = path.to_string_lossy().to_string();
    let module = dotted_module_path(path);

    let tree = match parse_source(path, source) {
        Ok(tree) => tree,
        Err(failure) => {
            debug!(%failure, "parse failure in per-file extraction");
            return FileOutcome::Failed(ErrorRecord {
                error: format!("Syntax error in {}: {}", file, failure.diagnostic()),
                module,
                file,
            });
        }
    };

    let mut walker = RecordWalker {
        source: source.as_bytes(),
        record: FileRecord {
            module: module.clone(),
            file,
            ..Default::default()
        },
    };
    walker.visit(tree.root_node(), &Scope::new(module));
    FileOutcome::Parsed(walker.record)
}

struct RecordWalker<'a> {
    source: &'a [u8],
    record: FileRecord,
}

impl RecordWalker<'_> {
    fn visit(&mut self, node: Node, scope: &Scope) {
        match SyntaxKind::of(node) {
            SyntaxKind::ClassDefinition => self.visit_class(node, &[], scope),
            SyntaxKind::FunctionDefinition => self.visit_function(node, &[], scope),
            SyntaxKind::DecoratedDefinition => self.visit_decorated(node, scope),
            SyntaxKind::Import => self.visit_import(node),
            SyntaxKind::ImportFrom | SyntaxKind::FutureImport => self.visit_from_import(node),
            SyntaxKind::Call => {
                self.record_call(node, scope);
                self.visit_children(node, scope);
            }
            SyntaxKind::Other => self.visit_children(node, scope),
        }
    }

    fn visit_children(&mut self, node: Node, scope: &Scope) {
        for child in children(node) {
            self.visit(child, scope);
        }
    }

    fn visit_decorated(&mut self, node: Node, scope: &Scope) {
        let decorators = decorator_expressions(node);
        match node.child_by_field_name("definition") {
            Some(def) if SyntaxKind::of(def) == SyntaxKind::ClassDefinition => {
                self.visit_class(def, &decorators, scope)
            }
            Some(def) if SyntaxKind::of(def) == SyntaxKind::FunctionDefinition => {
                self.visit_function(def, &decorators, scope)
            }
            _ => self.visit_children(node, scope),
        }
    }

    /// Bases and keywords, then body, then decorators.
    fn visit_class(&mut self, node: Node, decorators: &[Node], scope: &Scope) {
        let Some(name) = field_text(node, "name", self.source) else {
            return self.visit_children(node, scope);
        };
        let body = node.child_by_field_name("body");

        let class = ClassRecord {
            name: name.clone(),
            bases: base_expressions(node)
                .into_iter()
                .map(|b| self.name_of(b))
                .collect(),
            decorators: decorators.iter().map(|d| self.name_of(*d)).collect(),
            methods: body.map(|b| self.methods_of(b)).unwrap_or_default(),
            line: line_of(node),
            docstring: body.and_then(|b| docstring(b, self.source)),
        };
        self.record.classes.push(class);

        let inner = scope.in_class(name);
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            self.visit(superclasses, &inner);
        }
        if let Some(body) = body {
            self.visit(body, &inner);
        }
        for decorator in decorators {
            self.visit(*decorator, &inner);
        }
    }

    /// Parameters, then body, then decorators, then the return annotation.
    fn visit_function(&mut self, node: Node, decorators: &[Node], scope: &Scope) {
        let Some(name) = field_text(node, "name", self.source) else {
            return self.visit_children(node, scope);
        };
        if scope.class.is_none() {
            let function = self.function_record(node, decorators, false);
            self.record.functions.push(function);
        }

        let inner = scope.in_function(name);
        for field in ["parameters", "body"] {
            if let Some(child) = node.child_by_field_name(field) {
                self.visit(child, &inner);
            }
        }
        for decorator in decorators {
            self.visit(*decorator, &inner);
        }
        if let Some(returns) = node.child_by_field_name("return_type") {
            self.visit(returns, &inner);
        }
    }

    fn visit_import(&mut self, node: Node) {
        let line = line_of(node);
        for imported in imported_names(node, self.source) {
            self.record.imports.push(ImportRecord {
                kind: ImportKind::Import,
                module: None,
                name: imported.path,
                asname: imported.alias,
                line,
            });
        }
    }

    fn visit_from_import(&mut self, node: Node) {
        let line = line_of(node);
        let module = from_import_module(node, self.source).unwrap_or_default();
        for imported in imported_names(node, self.source) {
            self.record.imports.push(ImportRecord {
                kind: ImportKind::FromImport,
                module: Some(module.clone()),
                name: imported.path,
                asname: imported.alias,
                line,
            });
        }
    }

    fn record_call(&mut self, node: Node, scope: &Scope) {
        let func = node
            .child_by_field_name("function")
            .map(|f| self.name_of(f))
            .unwrap_or_default();
        self.record.calls.push(CallRecord {
            func,
            line: line_of(node),
            context_class: scope.class.clone(),
            context_function: scope.function.clone(),
        });
    }

    /// Direct function members of a class body.
    fn methods_of(&self, body: Node) -> Vec<FunctionRecord> {
        children(body)
            .into_iter()
            .filter_map(|stmt| match SyntaxKind::of(stmt) {
                SyntaxKind::FunctionDefinition => Some(self.function_record(stmt, &[], true)),
                SyntaxKind::DecoratedDefinition => {
                    let def = stmt.child_by_field_name("definition")?;
                    (SyntaxKind::of(def) == SyntaxKind::FunctionDefinition).then(|| {
                        self.function_record(def, &decorator_expressions(stmt), true)
                    })
                }
                _ => None,
            })
            .collect()
    }

    fn function_record(&self, node: Node, decorators: &[Node], is_method: bool) -> FunctionRecord {
        let body = node.child_by_field_name("body");
        FunctionRecord {
            name: field_text(node, "name", self.source).unwrap_or_default(),
            parameters: node
                .child_by_field_name("parameters")
                .map(|p| self.parameters_of(p))
                .unwrap_or_default(),
            return_type: node
                .child_by_field_name("return_type")
                .map(|r| self.name_of(r)),
            decorators: decorators.iter().map(|d| self.name_of(*d)).collect(),
            line: line_of(node),
            is_method,
            is_async: is_async(node),
            docstring: body.and_then(|b| docstring(b, self.source)),
        }
    }

    /// Plain positional parameters: not positional-only, not `*args`, not
    /// keyword-only, not `**kwargs`.
    fn parameters_of(&self, parameters: Node) -> Vec<ParameterRecord> {
        let mut params = Vec::new();
        for param in children(parameters) {
            let (name, type_hint) = match param.kind() {
                "identifier" => (node_text(param, self.source).to_string(), None),
                "default_parameter" => match field_text(param, "name", self.source) {
                    Some(name) => (name, None),
                    None => continue,
                },
                "typed_default_parameter" => match field_text(param, "name", self.source) {
                    Some(name) => (name, self.annotation_of(param)),
                    None => continue,
                },
                "typed_parameter" => {
                    let mut cursor = param.walk();
                    let first = param.named_children(&mut cursor).next();
                    match first {
                        Some(ident) if ident.kind() == "identifier" => (
                            node_text(ident, self.source).to_string(),
                            self.annotation_of(param),
                        ),
                        _ => break,
                    }
                }
                "positional_separator" => {
                    params.clear();
                    continue;
                }
                "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
                _ => continue,
            };
            params.push(ParameterRecord { name, type_hint });
        }
        params
    }

    fn annotation_of(&self, param: Node) -> Option<String> {
        param
            .child_by_field_name("type")
            .map(|t| self.name_of(t))
    }

    fn name_of(&self, node: Node) -> String {
        resolve_name(node, self.source).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(source: &str) -> FileRecord {
        match extract_record(Path::new("pkg/mod.py"), source) {
            FileOutcome::Parsed(record) => record,
            FileOutcome::Failed(err) => panic!("unexpected parse failure: {}", err.error),
        }
    }

    #[test]
    fn test_module_and_file_fields() {
        let rec = record("");
        assert_eq!(rec.module, "pkg.mod");
        assert_eq!(rec.file, "pkg/mod.py");
        assert!(rec.imports.is_empty() && rec.classes.is_empty());
    }

    #[test]
    fn test_import_records() {
        let rec = record("import os, numpy as np\nfrom .base import A as B, C\nfrom . import x\n");
        assert_eq!(rec.imports.len(), 5);
        assert_eq!(rec.imports[1].name, "numpy");
        assert_eq!(rec.imports[1].asname.as_deref(), Some("np"));
        assert_eq!(rec.imports[2].kind, ImportKind::FromImport);
        assert_eq!(rec.imports[2].module.as_deref(), Some("base"));
        assert_eq!(rec.imports[2].name, "A");
        assert_eq!(rec.imports[2].asname.as_deref(), Some("B"));
        assert_eq!(rec.imports[4].module.as_deref(), Some(""));
        assert_eq!(rec.imports[4].line, 3);

        let value = serde_json::to_value(&rec.imports[0]).unwrap();
        assert_eq!(
            value,
            json!({"type": "import", "name": "os", "asname": null, "line": 1})
        );
    }

    #[test]
    fn test_class_record_with_methods() {
        let source = r#"
@register
class UserService(BaseService, metaclass=Meta):
    """User service.

    Extends BaseService.
    """

    def __init__(self, name: str):
        super().__init__(name)

    @property
    def users(self) -> List[str]:
        return self.users

    async def fetch(self, *ids, limit=10):
        pass
"#;
        let rec = record(source);
        assert_eq!(rec.classes.len(), 1);
        let class = &rec.classes[0];
        assert_eq!(class.name, "UserService");
        assert_eq!(class.bases, vec!["BaseService"]);
        assert_eq!(class.decorators, vec!["register"]);
        assert_eq!(class.line, 3);
        assert_eq!(
            class.docstring.as_deref(),
            Some("User service.\n\nExtends BaseService.")
        );

        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "users", "fetch"]);
        assert!(class.methods.iter().all(|m| m.is_method));

        let init = &class.methods[0];
        assert_eq!(init.parameters.len(), 2);
        assert_eq!(init.parameters[1].type_hint.as_deref(), Some("str"));
        assert_eq!(class.methods[1].decorators, vec!["property"]);
        assert_eq!(class.methods[1].return_type.as_deref(), Some(""));
        let fetch = &class.methods[2];
        assert!(fetch.is_async);
        assert_eq!(fetch.parameters.len(), 1);

        // Methods are not top-level functions.
        assert!(rec.functions.is_empty());
    }

    #[test]
    fn test_function_records() {
        let source = r#"
def greet(name: str, /, greeting="hi", *, loud: bool = False) -> str:
    def inner():
        pass
    return format_greeting(name)
"#;
        let rec = record(source);
        let names: Vec<&str> = rec.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["greet", "inner"]);
        let greet = &rec.functions[0];
        assert!(!greet.is_method);
        assert_eq!(greet.return_type.as_deref(), Some("str"));
        assert_eq!(
            greet.parameters,
            vec![ParameterRecord {
                name: "greeting".to_string(),
                type_hint: None
            }]
        );
        assert_eq!(greet.docstring, None);
    }

    #[test]
    fn test_call_records_and_context() {
        let source = r#"
class Greeter:
    @decorate(config())
    def greet(self, name):
        return format_greeting(self.clean(name))

print(Greeter().greet("x"))
"#;
        let rec = record(source);
        let calls: Vec<(&str, Option<&str>, Option<&str>)> = rec
            .calls
            .iter()
            .map(|c| {
                (
                    c.func.as_str(),
                    c.context_class.as_deref(),
                    c.context_function.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            calls,
            vec![
                ("format_greeting", Some("Greeter"), Some("greet")),
                ("self.clean", Some("Greeter"), Some("greet")),
                ("decorate", Some("Greeter"), Some("greet")),
                ("config", Some("Greeter"), Some("greet")),
                ("print", None, None),
                ("Greeter.greet", None, None),
                ("Greeter", None, None),
            ]
        );
        assert_eq!(rec.calls[4].line, 7);
    }

    #[test]
    fn test_parse_failure_gives_error_record() {
        let outcome = extract_record(Path::new("bad.py"), "def broken(:\n    pass\n");
        assert!(outcome.is_error());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["module"], json!("bad"));
        assert_eq!(value["file"], json!("bad.py"));
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("Syntax error in bad.py: "));
        assert!(value.get("imports").is_none());
    }

    #[test]
    fn test_python2_source_gives_error_record() {
        for source in ["print \"hello\"\n", "exec \"x = 1\"\n"] {
            match extract_record(Path::new("legacy.py"), source) {
                FileOutcome::Failed(err) => {
                    assert!(err.error.starts_with("Syntax error in legacy.py: Missing parentheses"));
                    assert_eq!(err.module, "legacy");
                }
                FileOutcome::Parsed(_) => panic!("python 2 source accepted: {source}"),
            }
        }
    }

    #[test]
    fn test_deeply_nested_calls_give_error_record() {
        let source = format!("X = {}\n", vec!["f()"; 20_000].join(" + "));
        let outcome = extract_record(Path::new("gen.py"), &source);
        match outcome {
            FileOutcome::Failed(err) => assert!(err.error.contains("maximum recursion depth")),
            FileOutcome::Parsed(_) => panic!("deep nesting accepted"),
        }
    }

    #[test]
    fn test_unreadable_file_is_read_error() {
        let err = parse_file(Path::new("/definitely/not/here.py")).unwrap_err();
        assert!(matches!(err, CatgraphError::Read { .. }));
    }
}
