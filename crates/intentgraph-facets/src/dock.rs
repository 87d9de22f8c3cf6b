//! Docking facet
//!
//! Graph vocabulary: node types `dock.root`, `dock.group`, `dock.tab`;
//! ordered relations `dock.childGroups` (containment, kept acyclic by the
//! default cycle policy) and `dock.tabs` (tab order); prop `activeTab` on
//! groups naming the front tab.

use serde::{Deserialize, Serialize};

use intentgraph_core::{Diagnostic, Scope, Snapshot, ValidatorResult};
use intentgraph_core_types::NodeId;

/// Registry tag for the docking facet
pub const DOCK_FACET: &str = "dock";

/// Node type of the docking root
pub const TYPE_ROOT: &str = "dock.root";
/// Node type of a tab group
pub const TYPE_GROUP: &str = "dock.group";
/// Node type of a tab
pub const TYPE_TAB: &str = "dock.tab";

/// Ordered containment relation between groups
pub const REL_CHILD_GROUPS: &str = "dock.childGroups";
/// Ordered tab relation on a group
pub const REL_TABS: &str = "dock.tabs";

/// Prop on a group naming its active tab
pub const PROP_ACTIVE_TAB: &str = "activeTab";

/// The docking facet's derived summary of graph state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockSlice {
    /// Ids of `dock.root` nodes, sorted
    pub root_ids: Vec<NodeId>,
    /// Number of `dock.group` nodes
    pub group_count: usize,
}

/// Validate the docking structure against one snapshot
///
/// Pure over the snapshot: findings are diagnostics, never errors. A patch
/// that sets `activeTab` to a tab outside the group's tab relation commits
/// fine; this validator is where that inconsistency surfaces.
pub fn dock_validator(snapshot: &Snapshot) -> ValidatorResult {
    let root_ids = snapshot.nodes_of_type(TYPE_ROOT);
    let group_ids = snapshot.nodes_of_type(TYPE_GROUP);

    let mut diagnostics = Vec::new();

    if root_ids.is_empty() {
        diagnostics.push(Diagnostic::warning(
            "dock.rootMissing",
            "no dock.root node exists",
        ));
    }

    for group_id in &group_ids {
        let tabs = snapshot.ordered_edges(group_id, REL_TABS);

        if let Some(active) = snapshot.prop(group_id, PROP_ACTIVE_TAB) {
            let names_member = active
                .as_str()
                .map(|s| tabs.contains(&NodeId::new(s)))
                .unwrap_or(false);
            if !names_member {
                diagnostics.push(
                    Diagnostic::warning(
                        "dock.invalidActiveTab",
                        format!(
                            "activeTab of {} does not name a tab in its {} relation",
                            group_id, REL_TABS
                        ),
                    )
                    .with_node(group_id.clone())
                    .with_details(serde_json::json!({ "activeTab": active })),
                );
            }
        }

        if tabs.is_empty() && snapshot.ordered_edges(group_id, REL_CHILD_GROUPS).is_empty() {
            diagnostics.push(
                Diagnostic::info(
                    "dock.emptyGroup",
                    format!("group {} has neither tabs nor child groups", group_id),
                )
                .with_node(group_id.clone()),
            );
        }
    }

    let slice = DockSlice {
        root_ids,
        group_count: group_ids.len(),
    };
    ValidatorResult::from_slice(&slice, diagnostics)
}

/// Wire the docking validator into a scope under the `dock` tag
pub fn register_dock_facet(scope: &mut Scope) {
    scope.register_validator(DOCK_FACET, dock_validator);
    tracing::debug!(scope = %scope.id(), facet = DOCK_FACET, "facet registered");
}
