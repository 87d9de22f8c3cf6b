//! Editing facet
//!
//! Graph vocabulary: node type `editing.session` carrying a `selection`
//! prop (JSON array of node id strings); the `locked` trait on any node
//! marks it off-limits for editing.

use serde::{Deserialize, Serialize};

use intentgraph_core::{Diagnostic, Scope, Snapshot, ValidatorResult};
use intentgraph_core_types::NodeId;

/// Registry tag for the editing facet
pub const EDITING_FACET: &str = "editing";

/// Node type of an editing session
pub const TYPE_SESSION: &str = "editing.session";

/// Prop on a session listing the selected node ids
pub const PROP_SELECTION: &str = "selection";

/// Trait marking a node as locked against editing
pub const TRAIT_LOCKED: &str = "locked";

/// The editing facet's derived summary of graph state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingSlice {
    /// Number of `editing.session` nodes
    pub session_count: usize,
    /// All selected ids across sessions, in session/selection order
    pub selected_ids: Vec<NodeId>,
}

/// Validate editing sessions against one snapshot
///
/// A selection entry naming a missing node is a dangling selection; a
/// selection entry naming a `locked` node is reported but not removed -
/// cleanup is the consumer's call, through a patch.
pub fn editing_validator(snapshot: &Snapshot) -> ValidatorResult {
    let session_ids = snapshot.nodes_of_type(TYPE_SESSION);

    let mut selected_ids = Vec::new();
    let mut diagnostics = Vec::new();

    for session_id in &session_ids {
        let entries = snapshot
            .prop(session_id, PROP_SELECTION)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        for entry in entries {
            let Some(raw) = entry.as_str() else {
                diagnostics.push(
                    Diagnostic::warning(
                        "editing.malformedSelection",
                        format!("selection of {} contains a non-string entry", session_id),
                    )
                    .with_node(session_id.clone()),
                );
                continue;
            };
            let selected = NodeId::new(raw);

            if !snapshot.node_exists(&selected) {
                diagnostics.push(
                    Diagnostic::warning(
                        "editing.danglingSelection",
                        format!("selection of {} names missing node {}", session_id, selected),
                    )
                    .with_node(session_id.clone())
                    .with_details(serde_json::json!({ "selected": raw })),
                );
                continue;
            }

            if snapshot.has_trait(&selected, TRAIT_LOCKED) {
                diagnostics.push(
                    Diagnostic::warning(
                        "editing.lockedSelection",
                        format!("selection of {} includes locked node {}", session_id, selected),
                    )
                    .with_node(selected.clone()),
                );
            }

            selected_ids.push(selected);
        }
    }

    let slice = EditingSlice {
        session_count: session_ids.len(),
        selected_ids,
    };
    ValidatorResult::from_slice(&slice, diagnostics)
}

/// Wire the editing validator into a scope under the `editing` tag
pub fn register_editing_facet(scope: &mut Scope) {
    scope.register_validator(EDITING_FACET, editing_validator);
    tracing::debug!(scope = %scope.id(), facet = EDITING_FACET, "facet registered");
}
