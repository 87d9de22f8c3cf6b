//! Opaque branded identifiers
//!
//! Identifiers are newtypes over their underlying representation, validated
//! only at the construction boundary and never re-validated on every use.
//! `NodeId` serializes transparently as a bare string so external interface
//! shapes keep their bit-exact field values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a node within one store
///
/// Node ids are caller-supplied strings (e.g. "group:main"). Within one
/// store instance an id is unique and is never reused, even after the node
/// it named is deleted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Construct a NodeId from an opaque string
    ///
    /// This is the construction boundary: no validation happens on later use.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity of one runtime scope
///
/// A scope wires one graph instance to its facets and subscribers; the id
/// distinguishes scopes in logs and traces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    /// Generate a new random ScopeId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by `subscribe_state_view`, consumed by `unsubscribe`
///
/// An unsubscribe closure would have to hold a scope borrow for its whole
/// lifetime; a copyable handle passed back to `Scope::unsubscribe` keeps the
/// scope freely usable in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Construct from a raw counter value (allocated by the scope)
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw counter value
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_construction_and_display() {
        let id = NodeId::new("group:main");
        assert_eq!(id.as_str(), "group:main");
        assert_eq!(format!("{}", id), "group:main");
    }

    #[test]
    fn test_node_id_ordering_is_lexicographic() {
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        assert!(a < b);
    }

    #[test]
    fn test_node_id_serializes_as_bare_string() {
        let id = NodeId::new("tab:1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"tab:1\"");

        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_scope_id_generation() {
        let a = ScopeId::new();
        let b = ScopeId::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_subscription_id_round_trip() {
        let id = SubscriptionId::from_raw(7);
        assert_eq!(id.as_raw(), 7);
    }
}
