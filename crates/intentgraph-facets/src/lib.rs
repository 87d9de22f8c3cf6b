//! Facet-local wiring over the Intent Graph engine
//!
//! Each facet here is an independently-owned validation concern built on
//! the engine's single `register_validator` primitive; the engine itself
//! has no knowledge of docking or editing. Facets read one consistent
//! snapshot, derive a typed slice and report findings as diagnostics -
//! absence of required structure is a user-facing condition, never a fault.

pub mod dock;
pub mod editing;

pub use dock::{dock_validator, register_dock_facet, DockSlice, DOCK_FACET};
pub use editing::{editing_validator, register_editing_facet, EditingSlice, EDITING_FACET};
