//! Derived query indices
//!
//! Indices are caches over the node store, rebuilt from a full scan after
//! every committed patch. The full rebuild trades per-patch O(n) cost for
//! correctness: there is no incremental-maintenance path to get wrong, and
//! no externally observable window where an index disagrees with the store.
//! The ordered-edge index is not here: edge order is a primary attribute
//! maintained directly by `NodeStore`.

use std::collections::{BTreeSet, HashMap};

use crate::store::NodeStore;
use intentgraph_core_types::NodeId;

/// Mapping from type tag to the set of node ids carrying that tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeIndex {
    by_type: HashMap<String, BTreeSet<NodeId>>,
}

impl TypeIndex {
    /// Clear and re-derive the index from a full scan of the store
    ///
    /// Idempotent: rebuilding twice without an intervening mutation yields
    /// identical contents.
    pub fn rebuild(&mut self, store: &NodeStore) {
        self.by_type.clear();
        for id in store.list_node_ids() {
            if let Some(node) = store.get_node(&id) {
                self.by_type
                    .entry(node.node_type.clone())
                    .or_default()
                    .insert(id);
            }
        }
    }

    /// Node ids for a type tag, as a fresh sorted sequence
    ///
    /// Returns a new Vec each call; internal storage is never aliased out.
    pub fn get(&self, node_type: &str) -> Vec<NodeId> {
        self.by_type
            .get(node_type)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All type tags present, sorted
    pub fn type_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.by_type.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub(crate) fn snapshot_map(&self) -> HashMap<String, Vec<NodeId>> {
        self.by_type
            .iter()
            .map(|(tag, set)| (tag.clone(), set.iter().cloned().collect()))
            .collect()
    }
}

/// All derived indices over one store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryIndices {
    type_index: TypeIndex,
}

impl QueryIndices {
    /// Create empty indices (consistent with an empty store)
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every derived index from the store
    pub fn rebuild(&mut self, store: &NodeStore) {
        self.type_index.rebuild(store);
    }

    /// The type index
    pub fn types(&self) -> &TypeIndex {
        &self.type_index
    }
}
