//! Optional span instrumentation
//!
//! The collector records spans around patch and validation passes. It is
//! purely additive: it never alters engine semantics or the ordering of the
//! components it wraps. A handle that is dropped without `finish()` records
//! nothing.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;

/// One recorded span
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSpan {
    /// Span name, e.g. "commit" or "validate:dock"
    pub name: String,
    /// Start time, Unix millis
    pub start_ms: i64,
    /// End time, Unix millis
    pub end_ms: i64,
    /// `end_ms - start_ms`
    pub duration_ms: i64,
}

/// Accumulates spans in finish order
#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    spans: Rc<RefCell<Vec<TraceSpan>>>,
}

impl TraceCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a span; call `finish()` on the returned handle to record it
    pub fn start_span(&self, name: impl Into<String>) -> SpanHandle {
        SpanHandle {
            name: name.into(),
            start_ms: Utc::now().timestamp_millis(),
            sink: Rc::clone(&self.spans),
        }
    }

    /// The accumulated spans, in finish order
    pub fn list_spans(&self) -> Vec<TraceSpan> {
        self.spans.borrow().clone()
    }

    /// Drop all recorded spans
    pub fn clear(&self) {
        self.spans.borrow_mut().clear();
    }
}

/// Open span; finalize with `finish()`
///
/// Consuming `finish(self)` makes double-finalization unrepresentable.
pub struct SpanHandle {
    name: String,
    start_ms: i64,
    sink: Rc<RefCell<Vec<TraceSpan>>>,
}

impl SpanHandle {
    /// Finalize and record the span, returning a copy of the record
    pub fn finish(self) -> TraceSpan {
        let end_ms = Utc::now().timestamp_millis();
        let span = TraceSpan {
            name: self.name,
            start_ms: self.start_ms,
            end_ms,
            duration_ms: end_ms - self.start_ms,
        };
        self.sink.borrow_mut().push(span.clone());
        span
    }
}
