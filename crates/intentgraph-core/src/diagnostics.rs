//! Structured validation diagnostics
//!
//! Diagnostics are pure data: a validator re-run against an unchanged
//! snapshot reproduces identical diagnostics. They carry no validity state
//! of their own and no behavior beyond construction helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use intentgraph_core_types::NodeId;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One structured validation finding
///
/// Field names are part of the external interface contract and serialize
/// camelCase (`nodeId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Stable machine-readable code, e.g. "dock.invalidActiveTab"
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Severity level
    pub severity: Severity,

    /// Facet that produced this diagnostic (stamped by the runtime on merge)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,

    /// Node this finding targets, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,

    /// Free-form structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given code, severity and message
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            facet: None,
            node_id: None,
            details: None,
        }
    }

    /// Shorthand for an info-level diagnostic
    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    /// Shorthand for a warning-level diagnostic
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    /// Shorthand for an error-level diagnostic
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Attribute this diagnostic to a facet
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Target a specific node
    pub fn with_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Attach structured details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Result of one validator run: a typed slice plus its diagnostics
///
/// The slice crosses the registry boundary as a `serde_json::Value` and is
/// re-typed by the consumer through `StateView::get_slice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorResult {
    /// The facet's derived summary of graph state
    pub slice: Value,
    /// Findings, in the order the validator produced them
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidatorResult {
    /// Build a result from a serializable slice and its diagnostics
    ///
    /// Slices are plain serde data; serialization of a well-formed slice
    /// struct does not fail, so a failure here collapses to `Value::Null`
    /// with an error-level diagnostic rather than a panic.
    pub fn from_slice<S: Serialize>(slice: &S, diagnostics: Vec<Diagnostic>) -> Self {
        match serde_json::to_value(slice) {
            Ok(value) => Self {
                slice: value,
                diagnostics,
            },
            Err(e) => {
                let mut diagnostics = diagnostics;
                diagnostics.push(Diagnostic::error(
                    "core.sliceSerialization",
                    format!("Failed to serialize slice: {}", e),
                ));
                Self {
                    slice: Value::Null,
                    diagnostics,
                }
            }
        }
    }
}

/// Group diagnostics by facet, preserving relative order within each group
///
/// Diagnostics without a facet attribution group under the empty tag; the
/// runtime stamps the registering facet before merging, so merged output is
/// always fully attributed.
pub fn diagnostics_by_facet(list: &[Diagnostic]) -> BTreeMap<String, Vec<Diagnostic>> {
    let mut grouped: BTreeMap<String, Vec<Diagnostic>> = BTreeMap::new();
    for diagnostic in list {
        let facet = diagnostic.facet.clone().unwrap_or_default();
        grouped.entry(facet).or_default().push(diagnostic.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_helpers() {
        let d = Diagnostic::warning("dock.invalidActiveTab", "active tab not in tab relation")
            .with_facet("dock")
            .with_node(NodeId::new("group:a"))
            .with_details(json!({ "activeTab": "tab:9" }));

        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.facet.as_deref(), Some("dock"));
        assert_eq!(d.node_id, Some(NodeId::new("group:a")));
    }

    #[test]
    fn test_serializes_camel_case_and_lowercase_severity() {
        let d = Diagnostic::error("dock.rootMissing", "no dock root")
            .with_node(NodeId::new("root:0"));
        let value = serde_json::to_value(&d).unwrap();

        assert_eq!(value["severity"], json!("error"));
        assert_eq!(value["nodeId"], json!("root:0"));
        assert!(value.get("facet").is_none());
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_grouping_preserves_relative_order() {
        let list = vec![
            Diagnostic::info("a.first", "1").with_facet("a"),
            Diagnostic::info("b.first", "2").with_facet("b"),
            Diagnostic::info("a.second", "3").with_facet("a"),
        ];

        let grouped = diagnostics_by_facet(&list);
        let a_codes: Vec<&str> = grouped["a"].iter().map(|d| d.code.as_str()).collect();
        assert_eq!(a_codes, vec!["a.first", "a.second"]);
        assert_eq!(grouped["b"].len(), 1);
    }

    #[test]
    fn test_unattributed_diagnostics_group_under_empty_tag() {
        let list = vec![Diagnostic::info("loose", "no facet")];
        let grouped = diagnostics_by_facet(&list);
        assert_eq!(grouped[""].len(), 1);
    }

    #[test]
    fn test_validator_result_from_slice() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DemoSlice {
            root_ids: Vec<String>,
        }

        let result = ValidatorResult::from_slice(
            &DemoSlice {
                root_ids: vec!["r".to_string()],
            },
            vec![],
        );
        assert_eq!(result.slice["rootIds"], json!(["r"]));
        assert!(result.diagnostics.is_empty());
    }
}
