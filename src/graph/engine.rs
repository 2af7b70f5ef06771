//! The graph accumulator.
//!
//! `GraphBuilder` owns the objects and morphisms discovered during a run.
//! The structural walk borrows it mutably; the project driver merges
//! per-file builders into one and finalizes it into an immutable `Graph`.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::ids::{identity_id, morphism_id};
use super::types::*;

/// Append-only collection of objects and morphisms keyed by id.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    objects: BTreeMap<String, Object>,
    morphisms: BTreeMap<String, Morphism>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Objects ────────────────────────────────────────────────

    /// Insert an object. Returns `true` if the id was new.
    ///
    /// A repeated id keeps the existing object; metadata keys it lacks are
    /// filled in from the newcomer.
    pub fn add_object(&mut self, object: Object) -> bool {
        match self.objects.entry(object.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(object);
                true
            }
            Entry::Occupied(mut slot) => {
                trace!(id = %object.id, "object already present, merging metadata");
                let existing = &mut slot.get_mut().metadata;
                for (key, value) in object.metadata {
                    existing.entry(key).or_insert(value);
                }
                false
            }
        }
    }

    pub fn object(&self, id: &str) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ─── Morphisms ──────────────────────────────────────────────

    /// Record a morphism. Returns `true` if the (kind, source, target)
    /// triple was new.
    ///
    /// The target need not exist. Empty endpoints are refused.
    pub fn add_morphism(&mut self, kind: MorphismKind, source: &str, target: &str) -> bool {
        if source.is_empty() || target.is_empty() {
            debug!(%kind, source, target, "skipping morphism with empty endpoint");
            return false;
        }
        let id = morphism_id(kind, source, target);
        self.insert_morphism(Morphism {
            id,
            source: source.to_string(),
            target: target.to_string(),
            kind,
        })
    }

    fn insert_morphism(&mut self, morphism: Morphism) -> bool {
        match self.morphisms.entry(morphism.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(morphism);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn morphism(&self, id: &str) -> Option<&Morphism> {
        self.morphisms.get(id)
    }

    pub fn morphism_count(&self) -> usize {
        self.morphisms.len()
    }

    // ─── Merging & Finalization ─────────────────────────────────

    /// Merge another builder into this one, with the same first-writer-wins
    /// rules as direct insertion.
    pub fn absorb(&mut self, other: GraphBuilder) {
        for object in other.objects.into_values() {
            self.add_object(object);
        }
        for morphism in other.morphisms.into_values() {
            self.insert_morphism(morphism);
        }
    }

    /// Add one identity morphism per object and freeze the graph.
    pub fn finish(mut self, name: &str) -> Graph {
        let ids: Vec<String> = self.objects.keys().cloned().collect();
        for id in ids {
            self.insert_morphism(Morphism {
                id: identity_id(&id),
                source: id.clone(),
                target: id,
                kind: MorphismKind::Identity,
            });
        }
        debug!(
            objects = self.objects.len(),
            morphisms = self.morphisms.len(),
            "graph finalized"
        );
        Graph {
            name: name.to_string(),
            objects: self.objects,
            morphisms: self.morphisms,
        }
    }
}
