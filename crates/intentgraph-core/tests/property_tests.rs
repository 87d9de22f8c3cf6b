//! Property tests over randomized op sequences
//!
//! A small id/type/relation universe keeps collisions (duplicate adds,
//! dangling targets, re-deletes) frequent, so both the accept and reject
//! paths get exercised on every case.

mod common;

use common::nid;
use intentgraph_core::{
    apply, NoCycleChecks, NodeStore, Patch, PatchError, PatchOp, QueryIndices, Snapshot,
};
use proptest::prelude::*;
use serde_json::json;

const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];
const TYPES: [&str; 3] = ["dock.group", "dock.tab", "doc.block"];
const RELS: [&str; 2] = ["dock.tabs", "linksTo"];

fn arb_op() -> impl Strategy<Value = PatchOp> {
    let id = prop::sample::select(&IDS[..]);
    let node_type = prop::sample::select(&TYPES[..]);
    let rel = prop::sample::select(&RELS[..]);

    prop_oneof![
        (id.clone(), node_type).prop_map(|(i, t)| PatchOp::add_node(nid(i), t)),
        (id.clone(), 0u64..100).prop_map(|(i, v)| PatchOp::set_prop(nid(i), "n", json!(v))),
        id.clone().prop_map(|i| PatchOp::delete_node(nid(i))),
        (id.clone(), rel.clone(), id.clone())
            .prop_map(|(s, r, t)| PatchOp::add_edge(nid(s), r, nid(t))),
        (id.clone(), rel.clone(), id.clone())
            .prop_map(|(s, r, t)| PatchOp::remove_edge(nid(s), r, nid(t))),
        (id.clone(), rel, id, 0usize..4)
            .prop_map(|(s, r, t, p)| PatchOp::reorder_edge(nid(s), r, nid(t), p)),
    ]
}

/// Fold ops into a store one single-op commit at a time, counting successes
fn build_store(ops: Vec<PatchOp>) -> (NodeStore, usize) {
    let mut store = NodeStore::new();
    let mut committed = 0;
    for op in ops {
        match apply(store.clone(), &Patch::new(vec![op]), &NoCycleChecks) {
            Ok((next, _)) => {
                store = next;
                committed += 1;
            }
            Err(_) => {}
        }
    }
    (store, committed)
}

proptest! {
    // `prop_deleted_ids_are_never_reusable` assumes its chosen id was deleted,
    // which only a minority of random op sequences satisfy; the default global
    // reject budget (1024) runs out before enough cases pass the assume.
    #![proptest_config(ProptestConfig {
        max_global_rejects: 65536,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_generation_counts_successful_commits(ops in prop::collection::vec(arb_op(), 0..40)) {
        let (store, committed) = build_store(ops);
        prop_assert_eq!(store.generation(), committed as u64);
    }

    #[test]
    fn prop_index_rebuild_is_idempotent(ops in prop::collection::vec(arb_op(), 0..40)) {
        let (store, _) = build_store(ops);
        let mut indices = QueryIndices::new();
        indices.rebuild(&store);
        let first = indices.clone();
        indices.rebuild(&store);
        prop_assert_eq!(indices, first);
    }

    #[test]
    fn prop_relations_reference_only_live_unique_nodes(
        ops in prop::collection::vec(arb_op(), 0..60),
    ) {
        let (store, _) = build_store(ops);

        for (source, relation) in store.relation_keys() {
            prop_assert!(store.node_exists(&source), "dangling source {}", source);
            let targets = store.ordered_edges(&source, &relation);
            for target in targets {
                prop_assert!(store.node_exists(target), "dangling target {}", target);
            }
            let mut deduped = targets.to_vec();
            deduped.sort();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), targets.len(), "duplicate target in {}", relation);
        }
    }

    #[test]
    fn prop_snapshot_agrees_with_store_at_capture(
        ops in prop::collection::vec(arb_op(), 0..40),
    ) {
        let (store, _) = build_store(ops);
        let mut indices = QueryIndices::new();
        indices.rebuild(&store);
        let snapshot = Snapshot::capture(&store, &indices);

        prop_assert_eq!(snapshot.generation(), store.generation());
        prop_assert_eq!(snapshot.list_node_ids(), store.list_node_ids());
        for (source, relation) in store.relation_keys() {
            prop_assert_eq!(
                snapshot.ordered_edges(&source, &relation),
                store.ordered_edges(&source, &relation)
            );
        }
        for tag in indices.types().type_tags() {
            let mut from_snapshot = snapshot.nodes_of_type(&tag);
            from_snapshot.sort();
            prop_assert_eq!(from_snapshot, indices.types().get(&tag));
        }
    }

    #[test]
    fn prop_deleted_ids_are_never_reusable(
        ops in prop::collection::vec(arb_op(), 0..40),
        id in prop::sample::select(&IDS[..]),
        node_type in prop::sample::select(&TYPES[..]),
    ) {
        let (store, _) = build_store(ops);
        prop_assume!(store.id_ever_used(&nid(id)) && !store.node_exists(&nid(id)));

        let patch = Patch::new(vec![PatchOp::add_node(nid(id), node_type)]);
        let result = apply(store, &patch, &NoCycleChecks);
        let is_malformed = matches!(result, Err(PatchError::Malformed { .. }));
        prop_assert!(is_malformed);
    }
}
