//! Core identifier types shared across the Intent Graph crates
//!
//! This crate provides the foundational opaque identifiers used by the
//! engine and its facet crates:
//!
//! - **NodeId**: opaque node identity within one store
//! - **ScopeId**: identity of one runtime scope (composition root)
//! - **SubscriptionId**: handle returned by state-view subscriptions

pub mod ids;

pub use ids::{NodeId, ScopeId, SubscriptionId};
