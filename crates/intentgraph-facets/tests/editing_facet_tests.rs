//! Editing facet through a live scope

use intentgraph_facets::editing::{
    register_editing_facet, EditingSlice, EDITING_FACET, PROP_SELECTION, TRAIT_LOCKED,
    TYPE_SESSION,
};

use intentgraph_core::{Patch, PatchOp, Scope};
use intentgraph_core_types::NodeId;
use serde_json::json;
use std::collections::BTreeSet;

fn nid(s: &str) -> NodeId {
    NodeId::new(s)
}

fn editing_scope() -> Scope {
    let mut scope = Scope::new();
    register_editing_facet(&mut scope);
    scope
}

#[test]
fn test_selection_flows_into_slice() {
    let mut scope = editing_scope();
    scope
        .commit(&Patch::new(vec![
            PatchOp::add_node(nid("b1"), "doc.block"),
            PatchOp::add_node(nid("b2"), "doc.block"),
            PatchOp::add_node(nid("s"), TYPE_SESSION),
            PatchOp::set_prop(nid("s"), PROP_SELECTION, json!(["b2", "b1"])),
        ]))
        .unwrap();

    let slice: EditingSlice = scope.get_state_view().get_slice(EDITING_FACET).unwrap();
    assert_eq!(slice.session_count, 1);
    // Selection order is the prop's order, not id order
    assert_eq!(slice.selected_ids, vec![nid("b2"), nid("b1")]);
}

#[test]
fn test_deleting_selected_node_surfaces_dangling_selection() {
    let mut scope = editing_scope();
    scope
        .commit(&Patch::new(vec![
            PatchOp::add_node(nid("b"), "doc.block"),
            PatchOp::add_node(nid("s"), TYPE_SESSION),
            PatchOp::set_prop(nid("s"), PROP_SELECTION, json!(["b"])),
        ]))
        .unwrap();
    assert!(scope.get_state_view().diagnostics_for(EDITING_FACET).is_empty());

    scope
        .commit(&Patch::new(vec![PatchOp::delete_node(nid("b"))]))
        .unwrap();

    let view = scope.get_state_view();
    let diags = view.diagnostics_for(EDITING_FACET);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "editing.danglingSelection");
    let slice: EditingSlice = view.get_slice(EDITING_FACET).unwrap();
    assert!(slice.selected_ids.is_empty());
}

#[test]
fn test_locked_node_in_selection_is_reported() {
    let mut scope = editing_scope();
    scope
        .commit(&Patch::new(vec![
            PatchOp::AddNode {
                node_id: nid("frozen"),
                node_type: "doc.block".to_string(),
                props: Default::default(),
                traits: BTreeSet::from([TRAIT_LOCKED.to_string()]),
            },
            PatchOp::add_node(nid("s"), TYPE_SESSION),
            PatchOp::set_prop(nid("s"), PROP_SELECTION, json!(["frozen"])),
        ]))
        .unwrap();

    let view = scope.get_state_view();
    let diags = view.diagnostics_for(EDITING_FACET);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "editing.lockedSelection");
    // Kept in the slice; cleanup is the consumer's call
    let slice: EditingSlice = view.get_slice(EDITING_FACET).unwrap();
    assert_eq!(slice.selected_ids, vec![nid("frozen")]);
}

#[test]
fn test_both_facets_coexist_in_one_view() {
    use intentgraph_facets::dock::{register_dock_facet, DockSlice, DOCK_FACET};

    let mut scope = editing_scope();
    register_dock_facet(&mut scope);

    scope
        .commit(&Patch::new(vec![PatchOp::add_node(nid("s"), TYPE_SESSION)]))
        .unwrap();

    let view = scope.get_state_view();
    let editing: EditingSlice = view.get_slice(EDITING_FACET).unwrap();
    assert_eq!(editing.session_count, 1);
    let dock: DockSlice = view.get_slice(DOCK_FACET).unwrap();
    assert_eq!(dock.group_count, 0);
    assert!(view
        .diagnostics_for(DOCK_FACET)
        .iter()
        .any(|d| d.code == "dock.rootMissing"));
}
