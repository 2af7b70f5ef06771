//! # catgraph
//!
//! Categorical structure extraction for Python codebases.
//!
//! catgraph walks Python syntax trees and emits a graph of Objects
//! (modules, classes, functions, imported modules) and Morphisms
//! (`defines`, `import`, `inheritance`, `identity`) for downstream tools
//! that reason about code as a graph rather than as text.
//!
//! ## Two shapes
//!
//! - **Whole project**: every `*.py` under a root merged into one graph,
//!   finalized with identity morphisms and statistics.
//! - **Per file**: a descriptive record (imports, classes with methods,
//!   functions, call sites) for an external process to fold into a graph.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catgraph::{extract_project, ExtractorConfig};
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = ExtractorConfig::for_root(root)?;
//! let extraction = extract_project(root, "my-project", &config)?;
//! println!("{}", extraction.stats);
//! # Ok::<(), catgraph::CatgraphError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod parser;
pub mod walk;

// Re-exports for convenience
pub use config::ExtractorConfig;
pub use error::{CatgraphError, ParseFailure, Result};

// Graph re-exports
pub use graph::{
    extract_project, Graph, GraphBuilder, GraphStats, Morphism, MorphismKind, Object, ObjectKind,
    ProjectExtraction,
};
pub use parser::SupportedLanguage;

// Per-file shape
pub use walk::graph::extract_module_graph;
pub use walk::record::{extract_record, parse_file, FileOutcome, FileRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> ProjectExtraction {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        extract_project(dir.path(), "test", &ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_single_module_level_function() {
        let result = project(&[("app.py", "def f():\n    return 1\n")]);
        let graph = &result.graph;

        assert_eq!(graph.objects.len(), 2);
        assert_eq!(graph.objects["app"].kind, ObjectKind::Module);
        assert_eq!(graph.objects["app.f"].kind, ObjectKind::Function);
        assert_eq!(graph.morphisms_of_kind(MorphismKind::Defines).count(), 1);
        assert!(graph.morphisms.contains_key("defines:app->app.f"));
        assert_eq!(graph.morphisms_of_kind(MorphismKind::Identity).count(), 2);
        assert_eq!(graph.morphisms.len(), 3);
    }

    #[test]
    fn test_undefined_base_is_dangling_inheritance() {
        let result = project(&[("shapes.py", "class B(A):\n    pass\n")]);
        let graph = &result.graph;

        let inheritance: Vec<&Morphism> =
            graph.morphisms_of_kind(MorphismKind::Inheritance).collect();
        assert_eq!(inheritance.len(), 1);
        assert_eq!(inheritance[0].source, "shapes.B");
        assert_eq!(inheritance[0].target, "shapes.A");
        assert!(!graph.objects.contains_key("shapes.A"));

        let dangling: Vec<&str> = graph
            .dangling_morphisms()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(dangling, vec!["inheritance:shapes.B->shapes.A"]);
    }

    #[test]
    fn test_from_import_targets_module_only() {
        let result = project(&[("app.py", "from pkg.sub import thing\n")]);
        let graph = &result.graph;

        let imported: Vec<&Object> = graph.objects_of_kind(ObjectKind::ImportedModule).collect();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].id, "import:pkg.sub");
        assert!(graph.morphisms.contains_key("import:app->import:pkg.sub"));
        assert_eq!(graph.morphisms_of_kind(MorphismKind::Import).count(), 1);
        assert!(!graph.objects.keys().any(|id| id.contains("thing")));
    }

    #[test]
    fn test_same_import_from_two_files() {
        let result = project(&[
            ("a.py", "import requests\n"),
            ("pkg/b.py", "from requests import get\n"),
        ]);
        let graph = &result.graph;

        assert_eq!(graph.objects_of_kind(ObjectKind::ImportedModule).count(), 1);
        assert_eq!(graph.morphisms_of_kind(MorphismKind::Import).count(), 2);
        assert!(graph.morphisms.contains_key("import:a->import:requests"));
        assert!(graph.morphisms.contains_key("import:pkg.b->import:requests"));
    }

    #[test]
    fn test_every_object_has_one_identity() {
        let result = project(&[
            (
                "svc/users.py",
                "import os\nclass Users(Base):\n    def get(self):\n        pass\n",
            ),
            ("svc/__init__.py", "from .users import Users\n"),
        ]);
        let graph = &result.graph;

        for id in graph.objects.keys() {
            let identities: Vec<&Morphism> = graph
                .morphisms
                .values()
                .filter(|m| m.is_identity() && &m.source == id)
                .collect();
            assert_eq!(identities.len(), 1, "identity for {id}");
            assert_eq!(identities[0].id, format!("id_{id}"));
            assert_eq!(identities[0].target, *id);
        }
        assert_eq!(
            graph.morphisms_of_kind(MorphismKind::Identity).count(),
            graph.objects.len()
        );
    }

    #[test]
    fn test_repeated_relations_are_not_duplicated() {
        let source = "import os\nimport os\nfrom os import path\nclass C(Base, Base):\n    pass\n";
        let result = project(&[("m.py", source)]);
        let graph = &result.graph;

        let mut triples: Vec<(MorphismKind, &str, &str)> = graph
            .morphisms
            .values()
            .map(|m| (m.kind, m.source.as_str(), m.target.as_str()))
            .collect();
        let total = triples.len();
        triples.sort();
        triples.dedup();
        assert_eq!(triples.len(), total);
        assert_eq!(graph.morphisms_of_kind(MorphismKind::Import).count(), 1);
        assert_eq!(graph.morphisms_of_kind(MorphismKind::Inheritance).count(), 1);
    }

    #[test]
    fn test_syntax_error_among_valid_files() {
        let valid = project(&[("a.py", "def f():\n    pass\n"), ("b.py", "class K:\n    pass\n")]);
        let with_bad = project(&[
            ("a.py", "def f():\n    pass\n"),
            ("b.py", "class K:\n    pass\n"),
            ("broken.py", "class :\n"),
        ]);

        assert_eq!(with_bad.errors.len(), 1);
        assert!(valid.errors.is_empty());
        assert_eq!(with_bad.file_count, 3);
        assert_eq!(valid.graph.objects, with_bad.graph.objects);
        assert_eq!(valid.graph.morphisms, with_bad.graph.morphisms);
    }

    #[test]
    fn test_runs_serialize_identically() {
        let files = [
            ("core/models.py", "import json\nclass Model(base.Base):\n    def save(self):\n        pass\n"),
            ("core/views.py", "from core.models import Model\nclass View:\n    async def get(self):\n        pass\n"),
            ("main.py", "import core\ndef main():\n    pass\n"),
        ];
        let first = project(&files).graph.to_json_pretty().unwrap();
        let second = project(&files).graph.to_json_pretty().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_per_file_shape_is_not_a_graph() {
        let outcome = extract_record(Path::new("app.py"), "import os\ndef f():\n    g()\n");
        let value = serde_json::to_value(&outcome).unwrap();
        let mut keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["calls", "classes", "file", "functions", "imports", "module"]
        );
        assert_eq!(value["calls"][0]["func"], "g");
        assert_eq!(value["calls"][0]["context_function"], "f");
    }
}
