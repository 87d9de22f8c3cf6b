//! Spatial hit-testing across competing providers
//!
//! Pointer queries are read-only: they consult the same snapshots as
//! validators but never mutate the graph. Resolution is re-derivable purely
//! from provider order and declared scores; there is no hidden state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use intentgraph_core_types::NodeId;

/// Read-only pointer context passed through to providers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    /// Active modifier keys, e.g. "shift"
    #[serde(default)]
    pub modifiers: Vec<String>,

    /// Opaque payload carried by the interaction (e.g. a drag payload)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// One provider's answer for a pointer position
///
/// Field names are part of the external interface contract and serialize
/// camelCase (`nodeId`, `zoneId`, `regionType`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitTestResult {
    /// Graph node the hit resolves to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,

    /// Provider-local zone identifier, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,

    /// Kind of region hit, e.g. "tabBar" or "dropZone"
    pub region_type: String,

    /// Priority score; a missing score ranks below any numeric score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Free-form provider data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl HitTestResult {
    /// Build a result for a region type with no score
    pub fn region(region_type: impl Into<String>) -> Self {
        Self {
            node_id: None,
            zone_id: None,
            region_type: region_type.into(),
            score: None,
            data: None,
        }
    }

    /// Attach a priority score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Resolve to a graph node
    pub fn with_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Name a provider-local zone
    pub fn with_zone(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }
}

/// One source of spatial hit answers
pub trait HitTestProvider {
    /// Stable provider identifier, for diagnostics and logs
    fn id(&self) -> &str;

    /// Resolve a pointer position, or decline with `None`
    fn hit_test(&self, x: f64, y: f64, input: &PointerInput) -> Option<HitTestResult>;
}

/// Resolve a pointer position against an ordered provider list
///
/// Providers are tried in list order. Among all defined results the one
/// with the strictly highest score wins; a missing score ranks below any
/// numeric score; ties (including two missing scores) resolve to the
/// earliest provider in the input order.
pub fn hit_test_with_providers(
    providers: &[&dyn HitTestProvider],
    x: f64,
    y: f64,
    input: &PointerInput,
) -> Option<HitTestResult> {
    let mut best: Option<HitTestResult> = None;

    for provider in providers {
        if let Some(candidate) = provider.hit_test(x, y, input) {
            let wins = match &best {
                None => true,
                Some(current) => beats(candidate.score, current.score),
            };
            if wins {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Strictly-greater comparison with `None` as the lowest possible priority
fn beats(candidate: Option<f64>, incumbent: Option<f64>) -> bool {
    match (candidate, incumbent) {
        (Some(c), Some(i)) => c > i,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
