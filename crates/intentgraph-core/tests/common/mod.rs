use intentgraph_core::{apply, NoCycleChecks, NodeStore, Patch, PatchOp};
use intentgraph_core_types::NodeId;

/// Shorthand NodeId constructor
#[allow(dead_code)]
pub fn nid(s: &str) -> NodeId {
    NodeId::new(s)
}

/// Commit a batch of ops onto a store, panicking on rejection
///
/// Test setup helper; for rejection-path tests call `apply` directly.
#[allow(dead_code)]
pub fn commit(store: NodeStore, ops: Vec<PatchOp>) -> NodeStore {
    let (store, _) = apply(store, &Patch::new(ops), &NoCycleChecks).unwrap();
    store
}

/// A store with one group and two tabs wired in order: g -> [t1, t2]
#[allow(dead_code)]
pub fn group_with_two_tabs() -> NodeStore {
    commit(
        NodeStore::new(),
        vec![
            PatchOp::add_node(nid("g"), "dock.group"),
            PatchOp::add_node(nid("t1"), "dock.tab"),
            PatchOp::add_node(nid("t2"), "dock.tab"),
            PatchOp::add_edge(nid("g"), "dock.tabs", nid("t1")),
            PatchOp::add_edge(nid("g"), "dock.tabs", nid("t2")),
        ],
    )
}
