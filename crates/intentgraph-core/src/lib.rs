//! Intent Graph Core - in-memory typed node-graph engine
//!
//! This crate provides the canonical application-state engine that UI
//! extensions read and write through:
//! - Node store with ordered relations and collision-free id allocation
//! - Atomic patch application with a closed, typed operation set
//! - Derived query indices rebuilt after every commit (zero staleness)
//! - Immutable generation-bound snapshots for validators and readers
//! - Per-facet validator registry producing typed slices and diagnostics
//! - Runtime scope with synchronous post-commit pub/sub
//! - Deterministic spatial hit-testing across competing providers
//! - Optional span instrumentation around commit and validation passes
//!
//! Persistence, transport and rendering are external collaborators reachable
//! only through the patch, result, diagnostic, snapshot and subscription
//! surfaces defined here.

pub mod diagnostics;
pub mod errors;
pub mod facets;
pub mod hit;
pub mod indices;
pub mod logging;
pub mod model;
pub mod patch;
pub mod scope;
pub mod snapshot;
pub mod store;
pub mod trace;

// Re-export commonly used types
pub use diagnostics::{diagnostics_by_facet, Diagnostic, Severity, ValidatorResult};
pub use errors::{PatchError, Result};
pub use facets::{FacetRegistry, ValidatorFn};
pub use hit::{hit_test_with_providers, HitTestProvider, HitTestResult, PointerInput};
pub use indices::{QueryIndices, TypeIndex};
pub use intentgraph_core_types::{NodeId, ScopeId, SubscriptionId};
pub use model::Node;
pub use patch::{
    apply, AllRelationsAcyclic, CommitInfo, ContainmentCyclePolicy, CyclePolicy, NoCycleChecks,
    Patch, PatchOp,
};
pub use scope::{Scope, StateView};
pub use snapshot::Snapshot;
pub use store::NodeStore;
pub use trace::{SpanHandle, TraceCollector, TraceSpan};
