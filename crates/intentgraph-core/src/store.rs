use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::model::Node;
use intentgraph_core_types::NodeId;

/// One ordered relation instance: `(source, relation name)` → target sequence
///
/// Maintained as a dense ordered sequence plus an id → position index map.
/// Removals compact the sequence while preserving the relative order of the
/// survivors; there are no tombstones. Duplicate targets are disallowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedRelation {
    order: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
}

impl OrderedRelation {
    /// Number of targets in this relation instance
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the relation instance has no targets
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// O(1) membership check
    pub fn contains(&self, target: &NodeId) -> bool {
        self.index.contains_key(target)
    }

    /// Position of a target within the sequence, if present
    pub fn position(&self, target: &NodeId) -> Option<usize> {
        self.index.get(target).copied()
    }

    /// The ordered target sequence
    pub fn targets(&self) -> &[NodeId] {
        &self.order
    }

    /// Insert a target at the given position (append if at len)
    ///
    /// Caller guarantees the target is not already present and the position
    /// is within bounds; the patch engine validates both before calling.
    pub(crate) fn insert_at(&mut self, position: usize, target: NodeId) {
        self.order.insert(position, target);
        self.reindex_from(position);
    }

    /// Remove a target, compacting the sequence
    ///
    /// Returns false if the target was not present.
    pub(crate) fn remove(&mut self, target: &NodeId) -> bool {
        match self.index.remove(target) {
            Some(position) => {
                self.order.remove(position);
                self.reindex_from(position);
                true
            }
            None => false,
        }
    }

    /// Move an existing target to a new position, shifting the others
    pub(crate) fn move_to(&mut self, target: &NodeId, to_position: usize) {
        if let Some(from) = self.index.get(target).copied() {
            let id = self.order.remove(from);
            self.order.insert(to_position, id);
            self.reindex_from(from.min(to_position));
        }
    }

    fn reindex_from(&mut self, position: usize) {
        for (i, id) in self.order.iter().enumerate().skip(position) {
            self.index.insert(id.clone(), i);
        }
    }
}

/// In-memory store of nodes and ordered relations
///
/// HashMap-based storage for the single-threaded cooperative model: exactly
/// one writer (the patch engine) by construction, no interior locking. All
/// mutation primitives are crate-private; consumers mutate exclusively
/// through committed patches and read through snapshots.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    /// Map of node id to node
    nodes: HashMap<NodeId, Node>,
    /// Ordered relations keyed by (source id, relation name)
    edges: HashMap<(NodeId, String), OrderedRelation>,
    /// Ids that have ever existed; never handed out again after deletion
    retired: HashSet<NodeId>,
    /// Commit generation, bumped exactly once per committed patch
    generation: u64,
}

impl NodeStore {
    /// Create a new empty store at generation zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current commit generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// List all node ids in sorted order (deterministic)
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

    /// Whether an id has ever been used in this store (live or deleted)
    pub fn id_ever_used(&self, id: &NodeId) -> bool {
        self.retired.contains(id)
    }

    /// Ordered edge targets for `(source, relation)`, empty if none recorded
    pub fn ordered_edges(&self, source: &NodeId, relation: &str) -> &[NodeId] {
        self.edges
            .get(&(source.clone(), relation.to_string()))
            .map(|r| r.targets())
            .unwrap_or(&[])
    }

    /// All relation keys currently recorded, sorted (deterministic)
    pub fn relation_keys(&self) -> Vec<(NodeId, String)> {
        let mut keys: Vec<(NodeId, String)> = self.edges.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Access a relation instance, if one has been recorded
    pub fn relation(&self, source: &NodeId, relation: &str) -> Option<&OrderedRelation> {
        self.edges.get(&(source.clone(), relation.to_string()))
    }

    // ----- mutation primitives, reachable only from the patch engine -----

    pub(crate) fn insert_node(&mut self, node: Node) {
        self.retired.insert(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn set_prop(&mut self, id: &NodeId, key: &str, value: Value) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_prop(key, value);
        }
    }

    /// Remove a node, every relation it sources, and every membership where
    /// it is a target. The id stays retired.
    pub(crate) fn remove_node(&mut self, id: &NodeId) {
        self.nodes.remove(id);
        self.edges.retain(|(source, _), _| source != id);
        self.strip_target(id);
    }

    /// Remove an id from every ordered relation that lists it as a target
    pub(crate) fn strip_target(&mut self, id: &NodeId) {
        for relation in self.edges.values_mut() {
            relation.remove(id);
        }
        self.edges.retain(|_, relation| !relation.is_empty());
    }

    pub(crate) fn add_edge(
        &mut self,
        source: &NodeId,
        relation: &str,
        target: NodeId,
        position: usize,
    ) {
        self.edges
            .entry((source.clone(), relation.to_string()))
            .or_default()
            .insert_at(position, target);
    }

    pub(crate) fn remove_edge(&mut self, source: &NodeId, relation: &str, target: &NodeId) {
        let key = (source.clone(), relation.to_string());
        if let Some(rel) = self.edges.get_mut(&key) {
            rel.remove(target);
            if rel.is_empty() {
                self.edges.remove(&key);
            }
        }
    }

    pub(crate) fn reorder_edge(
        &mut self,
        source: &NodeId,
        relation: &str,
        target: &NodeId,
        to_position: usize,
    ) {
        if let Some(rel) = self
            .edges
            .get_mut(&(source.clone(), relation.to_string()))
        {
            rel.move_to(target, to_position);
        }
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation += 1;
    }

    /// Frozen copies of the node and edge maps, for snapshot capture
    pub(crate) fn freeze(&self) -> (HashMap<NodeId, Node>, HashMap<(NodeId, String), Vec<NodeId>>) {
        let nodes = self.nodes.clone();
        let edges = self
            .edges
            .iter()
            .map(|(key, rel)| (key.clone(), rel.targets().to_vec()))
            .collect();
        (nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nid(s: &str) -> NodeId {
        NodeId::new(s)
    }

    #[test]
    fn test_new_store_is_empty_at_generation_zero() {
        let store = NodeStore::new();
        assert_eq!(store.generation(), 0);
        assert!(store.list_node_ids().is_empty());
        assert!(store.ordered_edges(&nid("a"), "dock.tabs").is_empty());
    }

    #[test]
    fn test_insert_and_get_node() {
        let mut store = NodeStore::new();
        store.insert_node(Node::new(nid("tab:1"), "dock.tab"));

        assert!(store.node_exists(&nid("tab:1")));
        let node = store.get_node(&nid("tab:1")).unwrap();
        assert_eq!(node.node_type, "dock.tab");
    }

    #[test]
    fn test_removed_id_stays_retired() {
        let mut store = NodeStore::new();
        store.insert_node(Node::new(nid("tab:1"), "dock.tab"));
        store.remove_node(&nid("tab:1"));

        assert!(!store.node_exists(&nid("tab:1")));
        assert!(store.id_ever_used(&nid("tab:1")));
    }

    #[test]
    fn test_ordered_relation_preserves_insertion_order() {
        let mut rel = OrderedRelation::default();
        rel.insert_at(0, nid("a"));
        rel.insert_at(1, nid("c"));
        rel.insert_at(1, nid("b"));

        assert_eq!(rel.targets(), &[nid("a"), nid("b"), nid("c")]);
        assert_eq!(rel.position(&nid("c")), Some(2));
    }

    #[test]
    fn test_ordered_relation_remove_compacts() {
        let mut rel = OrderedRelation::default();
        rel.insert_at(0, nid("a"));
        rel.insert_at(1, nid("b"));
        rel.insert_at(2, nid("c"));

        assert!(rel.remove(&nid("b")));
        assert_eq!(rel.targets(), &[nid("a"), nid("c")]);
        assert_eq!(rel.position(&nid("c")), Some(1));
        assert!(!rel.remove(&nid("b")));
    }

    #[test]
    fn test_ordered_relation_move_to() {
        let mut rel = OrderedRelation::default();
        rel.insert_at(0, nid("a"));
        rel.insert_at(1, nid("b"));
        rel.insert_at(2, nid("c"));

        rel.move_to(&nid("c"), 0);
        assert_eq!(rel.targets(), &[nid("c"), nid("a"), nid("b")]);
        assert_eq!(rel.position(&nid("a")), Some(1));
        assert_eq!(rel.position(&nid("b")), Some(2));
    }

    #[test]
    fn test_strip_target_cleans_every_relation() {
        let mut store = NodeStore::new();
        store.insert_node(Node::new(nid("g1"), "dock.group"));
        store.insert_node(Node::new(nid("g2"), "dock.group"));
        store.insert_node(Node::new(nid("t"), "dock.tab"));
        store.add_edge(&nid("g1"), "dock.tabs", nid("t"), 0);
        store.add_edge(&nid("g2"), "dock.tabs", nid("t"), 0);

        store.strip_target(&nid("t"));

        assert!(store.ordered_edges(&nid("g1"), "dock.tabs").is_empty());
        assert!(store.ordered_edges(&nid("g2"), "dock.tabs").is_empty());
    }
}
