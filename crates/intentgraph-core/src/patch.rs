//! Atomic patch application
//!
//! This module provides the `apply()` function, the canonical entry point
//! for all graph mutations in the functional-boundary style.
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: either every op in the patch succeeds and a fully
//!   committed new state is returned, or the call fails and the caller's
//!   retained state remains valid. No partial commit is ever observable.
//! - **No panics**: invalid input returns typed errors.
//! - **Ordered**: ops are validated and applied in declared order against
//!   the in-flight state, so later ops may reference structure earlier ops
//!   introduced within the same patch.
//!
//! Deleting a node also strips it from every ordered relation that lists it
//! as a target, within the same commit.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{PatchError, Result};
use crate::model::Node;
use crate::store::NodeStore;
use intentgraph_core_types::NodeId;

/// An atomic, ordered batch of structural mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Ops, applied in declared order
    pub ops: Vec<PatchOp>,
}

impl Patch {
    /// Build a patch from a sequence of ops
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self { ops }
    }
}

/// One mutation operation
///
/// A closed variant set: adding a kind forces every handler site to be
/// revisited through exhaustive matching. Serializes as an internally
/// tagged union with tag field `kind` and camelCase payload fields, the
/// bit-exact wire shape external collaborators consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PatchOp {
    /// Create a node with a caller-supplied id
    AddNode {
        node_id: NodeId,
        node_type: String,
        #[serde(default)]
        props: BTreeMap<String, Value>,
        #[serde(default)]
        traits: BTreeSet<String>,
    },

    /// Set one property on an existing node
    SetProp {
        node_id: NodeId,
        key: String,
        value: Value,
    },

    /// Delete a node and clean every relation membership that lists it
    DeleteNode { node_id: NodeId },

    /// Append or insert a target into an ordered relation
    AddEdge {
        source_id: NodeId,
        relation: String,
        target_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },

    /// Remove a target from an ordered relation
    RemoveEdge {
        source_id: NodeId,
        relation: String,
        target_id: NodeId,
    },

    /// Move an existing target to a new position within its relation
    ReorderEdge {
        source_id: NodeId,
        relation: String,
        target_id: NodeId,
        to_position: usize,
    },
}

impl PatchOp {
    /// Create a bare node with no props or traits
    pub fn add_node(node_id: NodeId, node_type: impl Into<String>) -> Self {
        PatchOp::AddNode {
            node_id,
            node_type: node_type.into(),
            props: BTreeMap::new(),
            traits: BTreeSet::new(),
        }
    }

    /// Set a property on a node
    pub fn set_prop(node_id: NodeId, key: impl Into<String>, value: Value) -> Self {
        PatchOp::SetProp {
            node_id,
            key: key.into(),
            value,
        }
    }

    /// Delete a node
    pub fn delete_node(node_id: NodeId) -> Self {
        PatchOp::DeleteNode { node_id }
    }

    /// Append a target to the end of an ordered relation
    pub fn add_edge(source_id: NodeId, relation: impl Into<String>, target_id: NodeId) -> Self {
        PatchOp::AddEdge {
            source_id,
            relation: relation.into(),
            target_id,
            position: None,
        }
    }

    /// Insert a target at an explicit position within an ordered relation
    pub fn add_edge_at(
        source_id: NodeId,
        relation: impl Into<String>,
        target_id: NodeId,
        position: usize,
    ) -> Self {
        PatchOp::AddEdge {
            source_id,
            relation: relation.into(),
            target_id,
            position: Some(position),
        }
    }

    /// Remove a target from an ordered relation
    pub fn remove_edge(source_id: NodeId, relation: impl Into<String>, target_id: NodeId) -> Self {
        PatchOp::RemoveEdge {
            source_id,
            relation: relation.into(),
            target_id,
        }
    }

    /// Move a target to a new position within its ordered relation
    pub fn reorder_edge(
        source_id: NodeId,
        relation: impl Into<String>,
        target_id: NodeId,
        to_position: usize,
    ) -> Self {
        PatchOp::ReorderEdge {
            source_id,
            relation: relation.into(),
            target_id,
            to_position,
        }
    }

    /// Wire name of this op kind, used in error context
    pub fn kind_name(&self) -> &'static str {
        match self {
            PatchOp::AddNode { .. } => "addNode",
            PatchOp::SetProp { .. } => "setProp",
            PatchOp::DeleteNode { .. } => "deleteNode",
            PatchOp::AddEdge { .. } => "addEdge",
            PatchOp::RemoveEdge { .. } => "removeEdge",
            PatchOp::ReorderEdge { .. } => "reorderEdge",
        }
    }
}

/// Which relations must stay acyclic under edge mutation
///
/// Structural cycle detection applies to containment-style relations, not
/// to every relation kind; the policy makes that scope explicit and
/// configurable per runtime scope.
pub trait CyclePolicy {
    /// Whether edges in the named relation must not form a cycle
    fn is_acyclic(&self, relation: &str) -> bool;
}

/// Default policy: only the docking containment relation is acyclic
#[derive(Debug, Clone, Default)]
pub struct ContainmentCyclePolicy {
    extra: HashSet<String>,
}

impl ContainmentCyclePolicy {
    /// Containment relation guarded by default
    pub const DOCK_CHILD_GROUPS: &'static str = "dock.childGroups";

    /// Guard additional relations beyond the default containment relation
    pub fn with_relations<I, S>(relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: relations.into_iter().map(Into::into).collect(),
        }
    }
}

impl CyclePolicy for ContainmentCyclePolicy {
    fn is_acyclic(&self, relation: &str) -> bool {
        relation == Self::DOCK_CHILD_GROUPS || self.extra.contains(relation)
    }
}

/// Every relation must stay acyclic
#[derive(Debug, Clone, Copy, Default)]
pub struct AllRelationsAcyclic;

impl CyclePolicy for AllRelationsAcyclic {
    fn is_acyclic(&self, _relation: &str) -> bool {
        true
    }
}

/// No cycle checks at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCycleChecks;

impl CyclePolicy for NoCycleChecks {
    fn is_acyclic(&self, _relation: &str) -> bool {
        false
    }
}

/// Summary of one committed patch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    /// Generation the store moved to
    pub generation: u64,
    /// Number of ops applied
    pub ops_applied: usize,
}

/// Apply a patch to a store, returning the new committed state
///
/// This is the functional-boundary entry point for all graph mutations.
/// It takes ownership of the current state, executes every op in order,
/// and returns either a fully committed new state (generation bumped
/// exactly once) or a typed error. The caller's retained copy of the old
/// state stays valid on `Err`; the partially mutated scratch state is
/// dropped and never observable.
///
/// # Errors
///
/// * `InvalidTarget` - an op references a node or relation membership that
///   does not exist at its point in the op sequence
/// * `CycleDetected` - an edge op would create a cycle in a relation the
///   policy declares acyclic
/// * `Malformed` - an op payload fails type-level constraints (empty id or
///   key, reused node id, duplicate relation target, out-of-range position)
pub fn apply(
    mut state: NodeStore,
    patch: &Patch,
    policy: &dyn CyclePolicy,
) -> Result<(NodeStore, CommitInfo)> {
    for op in &patch.ops {
        apply_op(&mut state, op, policy)?;
    }

    state.bump_generation();
    let info = CommitInfo {
        generation: state.generation(),
        ops_applied: patch.ops.len(),
    };
    Ok((state, info))
}

fn apply_op(state: &mut NodeStore, op: &PatchOp, policy: &dyn CyclePolicy) -> Result<()> {
    match op {
        PatchOp::AddNode {
            node_id,
            node_type,
            props,
            traits,
        } => {
            if node_id.as_str().is_empty() {
                return Err(PatchError::Malformed {
                    reason: "addNode: node id cannot be empty".to_string(),
                });
            }
            if node_type.is_empty() {
                return Err(PatchError::Malformed {
                    reason: format!("addNode: node type cannot be empty for {}", node_id),
                });
            }
            // Ids are never reused within one store instance, even after
            // the node they named was deleted.
            if state.id_ever_used(node_id) {
                return Err(PatchError::Malformed {
                    reason: format!("addNode: node id already used: {}", node_id),
                });
            }

            let mut node = Node::new(node_id.clone(), node_type.clone());
            node.props = props.clone();
            node.traits = traits.clone();
            state.insert_node(node);
            Ok(())
        }

        PatchOp::SetProp {
            node_id,
            key,
            value,
        } => {
            if key.is_empty() {
                return Err(PatchError::Malformed {
                    reason: format!("setProp: key cannot be empty for {}", node_id),
                });
            }
            if !state.node_exists(node_id) {
                return Err(invalid_target(node_id, op));
            }
            // Prop values carry no referential constraint; a value naming a
            // node outside the expected relation is a validator concern.
            state.set_prop(node_id, key, value.clone());
            Ok(())
        }

        PatchOp::DeleteNode { node_id } => {
            if !state.node_exists(node_id) {
                return Err(invalid_target(node_id, op));
            }
            state.remove_node(node_id);
            Ok(())
        }

        PatchOp::AddEdge {
            source_id,
            relation,
            target_id,
            position,
        } => {
            if relation.is_empty() {
                return Err(PatchError::Malformed {
                    reason: format!("addEdge: relation name cannot be empty for {}", source_id),
                });
            }
            if !state.node_exists(source_id) {
                return Err(invalid_target(source_id, op));
            }
            if !state.node_exists(target_id) {
                return Err(invalid_target(target_id, op));
            }

            let existing = state.ordered_edges(source_id, relation);
            if existing.contains(target_id) {
                return Err(PatchError::Malformed {
                    reason: format!(
                        "addEdge: duplicate target {} in relation '{}' of {}",
                        target_id, relation, source_id
                    ),
                });
            }
            let at = position.unwrap_or(existing.len());
            if at > existing.len() {
                return Err(PatchError::Malformed {
                    reason: format!(
                        "addEdge: position {} out of range (len {}) in relation '{}' of {}",
                        at,
                        existing.len(),
                        relation,
                        source_id
                    ),
                });
            }
            if policy.is_acyclic(relation) && creates_cycle(state, relation, source_id, target_id) {
                return Err(PatchError::CycleDetected {
                    relation: relation.clone(),
                    node_id: target_id.as_str().to_string(),
                });
            }

            state.add_edge(source_id, relation, target_id.clone(), at);
            Ok(())
        }

        PatchOp::RemoveEdge {
            source_id,
            relation,
            target_id,
        } => {
            if !state.node_exists(source_id) {
                return Err(invalid_target(source_id, op));
            }
            if !state.ordered_edges(source_id, relation).contains(target_id) {
                return Err(invalid_target(target_id, op));
            }
            state.remove_edge(source_id, relation, target_id);
            Ok(())
        }

        PatchOp::ReorderEdge {
            source_id,
            relation,
            target_id,
            to_position,
        } => {
            if !state.node_exists(source_id) {
                return Err(invalid_target(source_id, op));
            }
            let existing = state.ordered_edges(source_id, relation);
            if !existing.contains(target_id) {
                return Err(invalid_target(target_id, op));
            }
            if *to_position >= existing.len() {
                return Err(PatchError::Malformed {
                    reason: format!(
                        "reorderEdge: position {} out of range (len {}) in relation '{}' of {}",
                        to_position,
                        existing.len(),
                        relation,
                        source_id
                    ),
                });
            }
            state.reorder_edge(source_id, relation, target_id, *to_position);
            Ok(())
        }
    }
}

fn invalid_target(node_id: &NodeId, op: &PatchOp) -> PatchError {
    PatchError::InvalidTarget {
        node_id: node_id.as_str().to_string(),
        op: op.kind_name().to_string(),
    }
}

/// Would adding `source → target` close a cycle in `relation`?
///
/// Walks the relation forward from the prospective target; a path back to
/// the source (or a self-edge) means the new edge closes a cycle.
fn creates_cycle(state: &NodeStore, relation: &str, source: &NodeId, target: &NodeId) -> bool {
    if source == target {
        return true;
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = vec![target.clone()];

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        for next in state.ordered_edges(&current, relation) {
            if next == source {
                return true;
            }
            stack.push(next.clone());
        }
    }
    false
}
