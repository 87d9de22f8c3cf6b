//! Immutable generation-bound read views
//!
//! A snapshot is taken once per commit, after the index rebuild, and is the
//! only view validators and hit-test providers read. Every read against it
//! stays stable for the full pass even if a caller starts composing the next
//! patch, because the snapshot holds frozen copies shared behind `Arc`.
//! Cloning a snapshot is cheap; holding one across later commits is safe.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::indices::QueryIndices;
use crate::model::Node;
use crate::store::NodeStore;
use intentgraph_core_types::NodeId;

/// Immutable read view of the graph at one commit generation
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    nodes: Arc<HashMap<NodeId, Node>>,
    edges: Arc<HashMap<(NodeId, String), Vec<NodeId>>>,
    types: Arc<HashMap<String, Vec<NodeId>>>,
}

impl Snapshot {
    /// Capture a snapshot of the store and its (already rebuilt) indices
    pub fn capture(store: &NodeStore, indices: &QueryIndices) -> Self {
        let (nodes, edges) = store.freeze();
        Self {
            generation: store.generation(),
            nodes: Arc::new(nodes),
            edges: Arc::new(edges),
            types: Arc::new(indices.types().snapshot_map()),
        }
    }

    /// The store generation this snapshot is bound to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All node ids at this generation, sorted
    pub fn list_node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get a node by id
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// O(1) node existence check
    pub fn node_exists(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Ordered edge targets for `(source, relation)` at this generation
    pub fn ordered_edges(&self, source: &NodeId, relation: &str) -> &[NodeId] {
        self.edges
            .get(&(source.clone(), relation.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Node ids carrying a type tag, as a fresh sorted sequence
    pub fn nodes_of_type(&self, node_type: &str) -> Vec<NodeId> {
        self.types.get(node_type).cloned().unwrap_or_default()
    }

    /// Read a property value on a node
    pub fn prop(&self, id: &NodeId, key: &str) -> Option<&Value> {
        self.nodes.get(id).and_then(|node| node.prop(key))
    }

    /// Check whether a node carries a trait tag
    pub fn has_trait(&self, id: &NodeId, trait_tag: &str) -> bool {
        self.nodes
            .get(id)
            .map(|node| node.has_trait(trait_tag))
            .unwrap_or(false)
    }
}
