use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use intentgraph_core_types::NodeId;

/// Node - one typed vertex in the intent graph
///
/// A node carries a type tag (e.g. "dock.group"), a property map and a set
/// of capability traits (e.g. "locked"). Nodes are exclusively owned by the
/// `NodeStore`; consumers refer to them by id and read them through
/// snapshots, never by holding references across commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within the owning store
    pub id: NodeId,

    /// Type tag, the primary classification queried through the type index
    #[serde(rename = "type")]
    pub node_type: String,

    /// Property map (ordered for deterministic serialization)
    pub props: BTreeMap<String, Value>,

    /// Capability trait tags queried by validators (e.g. "deletable")
    pub traits: BTreeSet<String>,
}

impl Node {
    /// Create a new node with the given id and type tag, no props, no traits
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            props: BTreeMap::new(),
            traits: BTreeSet::new(),
        }
    }

    /// Read a property value by key
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Check whether this node carries the given trait tag
    pub fn has_trait(&self, trait_tag: &str) -> bool {
        self.traits.contains(trait_tag)
    }

    /// Set a property value, replacing any previous value for the key
    pub(crate) fn set_prop(&mut self, key: impl Into<String>, value: Value) {
        self.props.insert(key.into(), value);
    }
}
