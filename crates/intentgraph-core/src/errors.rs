use thiserror::Error;

/// Result type alias using PatchError
pub type Result<T> = std::result::Result<T, PatchError>;

/// Typed error taxonomy for patch application
///
/// All fallible engine operations return `Result<T>`; nothing in the core
/// throws as its primary control-flow mechanism. Each variant maps to a
/// stable error code usable for programmatic matching by external callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    /// An op references a node or relation membership that does not exist
    #[error("Invalid target in op '{op}': {node_id}")]
    InvalidTarget { node_id: String, op: String },

    /// An edge op would create a cycle in a relation that must stay acyclic
    #[error("Cycle detected: adding edge in relation '{relation}' would create a cycle through {node_id}")]
    CycleDetected { relation: String, node_id: String },

    /// An op payload fails type-level constraints
    #[error("Malformed op: {reason}")]
    Malformed { reason: String },
}

impl PatchError {
    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            PatchError::InvalidTarget { .. } => "ERR_INVALID_TARGET",
            PatchError::CycleDetected { .. } => "ERR_CYCLE_DETECTED",
            PatchError::Malformed { .. } => "ERR_MALFORMED",
        }
    }
}
