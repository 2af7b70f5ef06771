//! Categorical graph module.
//!
//! Provides the Object/Morphism data model, the id scheme, the
//! accumulating builder, statistics, and the whole-project driver.

pub mod builder;
pub mod engine;
pub mod ids;
pub mod stats;
pub mod types;

pub use builder::{discover_python_files, extract_project, FileFailure, ProjectExtraction};
pub use engine::GraphBuilder;
pub use stats::{GraphStats, TypeCount};
pub use types::{Graph, Metadata, Morphism, MorphismKind, Object, ObjectKind};
