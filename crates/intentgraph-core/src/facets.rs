//! Facet registry - open per-facet validator dispatch
//!
//! A facet is a named, independently-owned validation concern (docking,
//! editing, ...) that registers one validator against the shared graph.
//! The registry maps facet tags to boxed validator functions and has no
//! facet-specific knowledge of its own; facet crates wire themselves in
//! through this single primitive.
//!
//! A validator is a pure function over a snapshot: same snapshot in, same
//! result out, no side effects, no access to mutation primitives.

use crate::diagnostics::ValidatorResult;
use crate::snapshot::Snapshot;

/// Boxed validator function for one facet
pub type ValidatorFn = Box<dyn Fn(&Snapshot) -> ValidatorResult>;

/// Registry of facet validators, preserving registration order
#[derive(Default)]
pub struct FacetRegistry {
    // Registration order is the run order; lookup is a linear scan over a
    // small list rather than a map, keeping order and identity in one place.
    validators: Vec<(String, ValidatorFn)>,
}

impl FacetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator under a facet tag
    ///
    /// Registering the same tag twice replaces the previous validator (last
    /// registration wins, silently) while keeping the facet's original run
    /// position.
    pub fn register<F>(&mut self, facet_tag: impl Into<String>, validator: F)
    where
        F: Fn(&Snapshot) -> ValidatorResult + 'static,
    {
        let tag = facet_tag.into();
        let boxed: ValidatorFn = Box::new(validator);
        match self.validators.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = boxed,
            None => self.validators.push((tag, boxed)),
        }
    }

    /// Whether a facet tag is registered
    pub fn contains(&self, facet_tag: &str) -> bool {
        self.validators.iter().any(|(t, _)| t == facet_tag)
    }

    /// Number of registered facets
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no facets are registered
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Registered facet tags, in run order
    pub fn facet_tags(&self) -> Vec<String> {
        self.validators.iter().map(|(t, _)| t.clone()).collect()
    }

    /// Iterate validators in run order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidatorFn)> {
        self.validators.iter().map(|(t, f)| (t.as_str(), f))
    }
}

impl std::fmt::Debug for FacetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetRegistry")
            .field("facets", &self.facet_tags())
            .finish()
    }
}
