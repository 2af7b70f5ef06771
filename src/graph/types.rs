//! Core types for the categorical code graph.
//!
//! Objects are structural entities (modules, classes, functions, import
//! targets); morphisms are typed, directed relations between them. Both are
//! keyed by their textual id, which is the contract downstream tooling
//! indexes on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form descriptive metadata. Never part of identity.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The kind of an object in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A source file, named by its dotted module path.
    Module,
    /// A class definition.
    Class,
    /// A function or method definition.
    Function,
    /// An external import target (`import:` ids).
    ImportedModule,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Module => write!(f, "module"),
            ObjectKind::Class => write!(f, "class"),
            ObjectKind::Function => write!(f, "function"),
            ObjectKind::ImportedModule => write!(f, "imported_module"),
        }
    }
}

/// The kind of a morphism (relationship) in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphismKind {
    /// Scope defines a member (Module -> Class, Class -> Function, ...).
    Defines,
    /// Module imports an external module (Module -> ImportedModule).
    Import,
    /// Class inherits from a base (Class -> Class, possibly dangling).
    Inheritance,
    /// Self-loop added to every object at finalization.
    Identity,
}

impl fmt::Display for MorphismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphismKind::Defines => write!(f, "defines"),
            MorphismKind::Import => write!(f, "import"),
            MorphismKind::Inheritance => write!(f, "inheritance"),
            MorphismKind::Identity => write!(f, "identity"),
        }
    }
}

/// A structural entity in the analyzed codebase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Unqualified name as written in source.
    pub name: String,
    pub metadata: Metadata,
}

impl Object {
    pub fn new(id: String, kind: ObjectKind, name: String, metadata: Metadata) -> Self {
        Self {
            id,
            kind,
            name,
            metadata,
        }
    }
}

/// A directed, typed edge between two object ids.
///
/// The target may name an object that does not exist in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morphism {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: MorphismKind,
}

impl Morphism {
    pub fn is_identity(&self) -> bool {
        self.kind == MorphismKind::Identity
    }
}

/// The finalized, serializable graph.
///
/// Exactly three fields on the wire: `name`, `objects`, `morphisms`. Both
/// collections are id-keyed maps, emitted in sorted id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub objects: BTreeMap<String, Object>,
    pub morphisms: BTreeMap<String, Morphism>,
}

impl Graph {
    /// Morphisms whose target has no matching object.
    pub fn dangling_morphisms(&self) -> impl Iterator<Item = &Morphism> {
        self.morphisms
            .values()
            .filter(move |m| !self.objects.contains_key(&m.target))
    }

    pub fn morphisms_of_kind(&self, kind: MorphismKind) -> impl Iterator<Item = &Morphism> {
        self.morphisms.values().filter(move |m| m.kind == kind)
    }

    pub fn objects_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &Object> {
        self.objects.values().filter(move |o| o.kind == kind)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
