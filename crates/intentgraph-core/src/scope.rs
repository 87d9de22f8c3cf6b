//! Runtime scope - the composition root
//!
//! A scope wires one node store, its derived indices, the facet registry
//! and the subscriber list into a single write path. The commit order is
//! fixed and is the engine's central consistency guarantee:
//!
//! mutate → reindex → snapshot → validate → publish
//!
//! Validators never observe an index that has not caught up with the
//! mutation that triggered them, and subscribers only ever see fully
//! committed generations. The whole sequence is one uninterruptible logical
//! step: single-threaded, no suspension point, no other patch may begin
//! against the same store until it completes.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::diagnostics::{diagnostics_by_facet, Diagnostic, ValidatorResult};
use crate::errors::Result;
use crate::facets::FacetRegistry;
use crate::indices::QueryIndices;
use crate::patch::{self, CommitInfo, ContainmentCyclePolicy, CyclePolicy, Patch};
use crate::snapshot::Snapshot;
use crate::store::NodeStore;
use crate::trace::TraceCollector;
use intentgraph_core_types::{ScopeId, SubscriptionId};

type SubscriberFn = Box<dyn FnMut(&StateView)>;

/// Owned, read-only view of the most recent validation results
///
/// Built per commit and handed to subscribers; consumers re-type facet
/// slices through `get_slice`.
#[derive(Debug, Clone)]
pub struct StateView {
    generation: u64,
    slices: BTreeMap<String, Value>,
    diagnostics: BTreeMap<String, Vec<Diagnostic>>,
}

impl StateView {
    /// Generation this view reflects
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The most recent slice for a facet, re-typed
    ///
    /// Returns `None` if the facet never registered, never ran, or its
    /// slice does not deserialize into `T`.
    pub fn get_slice<T: DeserializeOwned>(&self, facet_tag: &str) -> Option<T> {
        self.slices
            .get(facet_tag)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// The raw slice value for a facet
    pub fn get_slice_value(&self, facet_tag: &str) -> Option<&Value> {
        self.slices.get(facet_tag)
    }

    /// All diagnostics, grouped by facet
    pub fn diagnostics(&self) -> &BTreeMap<String, Vec<Diagnostic>> {
        &self.diagnostics
    }

    /// Diagnostics for one facet, empty if none
    pub fn diagnostics_for(&self, facet_tag: &str) -> &[Diagnostic] {
        self.diagnostics
            .get(facet_tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// One graph instance wired to its facets and subscribers
pub struct Scope {
    id: ScopeId,
    store: NodeStore,
    indices: QueryIndices,
    registry: FacetRegistry,
    results: BTreeMap<String, ValidatorResult>,
    subscribers: Vec<(SubscriptionId, SubscriberFn)>,
    next_subscription: u64,
    cycle_policy: Box<dyn CyclePolicy>,
    trace: TraceCollector,
    last_snapshot: Option<Snapshot>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Create a scope with the default containment cycle policy
    pub fn new() -> Self {
        Self::with_cycle_policy(Box::new(ContainmentCyclePolicy::default()))
    }

    /// Create a scope with an explicit cycle policy
    pub fn with_cycle_policy(cycle_policy: Box<dyn CyclePolicy>) -> Self {
        Self {
            id: ScopeId::new(),
            store: NodeStore::new(),
            indices: QueryIndices::new(),
            registry: FacetRegistry::new(),
            results: BTreeMap::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            cycle_policy,
            trace: TraceCollector::new(),
            last_snapshot: None,
        }
    }

    /// This scope's identity
    pub fn id(&self) -> &ScopeId {
        &self.id
    }

    /// Read access to the store
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Read access to the derived indices
    pub fn indices(&self) -> &QueryIndices {
        &self.indices
    }

    /// The span collector wrapping commit and validation passes
    pub fn trace(&self) -> &TraceCollector {
        &self.trace
    }

    /// The snapshot taken at the most recent commit, if any
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    /// Register a validator under a facet tag
    ///
    /// Last registration for a tag wins; run position of the tag is kept.
    /// The new validator does not run until the next commit or an explicit
    /// `revalidate()`.
    pub fn register_validator<F>(&mut self, facet_tag: impl Into<String>, validator: F)
    where
        F: Fn(&Snapshot) -> ValidatorResult + 'static,
    {
        self.registry.register(facet_tag, validator);
    }

    /// Registered facet tags, in run order
    pub fn registered_facets(&self) -> Vec<String> {
        self.registry.facet_tags()
    }

    /// Apply a patch as one atomic commit
    ///
    /// On success the full cascade runs synchronously before this returns:
    /// index rebuild, snapshot capture, every registered validator against
    /// that one snapshot, then subscriber notification. On failure nothing
    /// changes: no rebuild, no validator runs, no notification.
    ///
    /// # Errors
    ///
    /// Propagates the `PatchError` from `patch::apply`; the store is
    /// unchanged from before the call.
    pub fn commit(&mut self, patch: &Patch) -> Result<CommitInfo> {
        let span = self.trace.start_span("commit");

        let (next, info) = match patch::apply(self.store.clone(), patch, self.cycle_policy.as_ref())
        {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(scope = %self.id, code = e.code(), "patch rejected");
                span.finish();
                return Err(e);
            }
        };

        self.store = next;
        self.indices.rebuild(&self.store);
        let snapshot = Snapshot::capture(&self.store, &self.indices);
        self.run_validators(&snapshot);
        self.last_snapshot = Some(snapshot);
        span.finish();

        tracing::debug!(
            scope = %self.id,
            generation = info.generation,
            ops = info.ops_applied,
            "patch committed"
        );

        let view = self.get_state_view();
        self.notify_subscribers(&view);

        Ok(info)
    }

    /// Re-run all registered validators against the current generation
    ///
    /// Used after late registration so a facet can populate its slice
    /// without a synthetic empty patch. Does not notify subscribers;
    /// notification is once per successful commit by contract.
    pub fn revalidate(&mut self) {
        let snapshot = Snapshot::capture(&self.store, &self.indices);
        self.run_validators(&snapshot);
        self.last_snapshot = Some(snapshot);
    }

    /// The most recent validation results as an owned view
    pub fn get_state_view(&self) -> StateView {
        let slices = self
            .results
            .iter()
            .map(|(tag, result)| (tag.clone(), result.slice.clone()))
            .collect();

        // Merge in registry run order so relative order within each facet
        // group matches the order the validators produced.
        let mut all: Vec<Diagnostic> = Vec::new();
        for tag in self.registry.facet_tags() {
            if let Some(result) = self.results.get(&tag) {
                all.extend(result.diagnostics.iter().cloned());
            }
        }

        StateView {
            generation: self.store.generation(),
            slices,
            diagnostics: diagnostics_by_facet(&all),
        }
    }

    /// Register a callback invoked once per successful commit
    ///
    /// Callbacks run synchronously on the committing caller, in
    /// registration order, and must be non-blocking by contract.
    pub fn subscribe_state_view<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StateView) + 'static,
    {
        let id = SubscriptionId::from_raw(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription; returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn run_validators(&mut self, snapshot: &Snapshot) {
        let mut fresh: Vec<(String, ValidatorResult)> = Vec::new();

        for (tag, validator) in self.registry.iter() {
            let span = self.trace.start_span(format!("validate:{}", tag));
            let mut result = validator(snapshot);
            span.finish();

            // Stamp the registering facet onto unattributed diagnostics so
            // the merged grouping is total.
            for diagnostic in &mut result.diagnostics {
                if diagnostic.facet.is_none() {
                    diagnostic.facet = Some(tag.to_string());
                }
            }
            fresh.push((tag.to_string(), result));
        }

        for (tag, result) in fresh {
            self.results.insert(tag, result);
        }
    }

    fn notify_subscribers(&mut self, view: &StateView) {
        for (id, callback) in &mut self.subscribers {
            // A panicking subscriber is isolated: it must not prevent
            // delivery to later subscribers nor unwind the commit.
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(view)));
            if outcome.is_err() {
                tracing::error!(subscription = id.as_raw(), "subscriber panicked; isolated");
            }
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("generation", &self.store.generation())
            .field("facets", &self.registry.facet_tags())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
