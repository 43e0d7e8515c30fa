//! Event sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use super::TelemetryEvent;

/// Destination for telemetry events.
///
/// Implementations must be cheap to call; the core emits inline on the
/// request path.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: TelemetryEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: TelemetryEvent) {
        (**self).emit(event)
    }
}

/// Type-erased sink shared between components.
pub type SharedSink = Arc<dyn EventSink>;

/// Sink that forwards every event to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: TelemetryEvent) {
        if event.is_failure() {
            tracing::warn!(event = event.name(), details = ?event, "telemetry");
        } else {
            tracing::debug!(event = event.name(), details = ?event, "telemetry");
        }
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of all recorded events.
    pub fn snapshot(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().push(event);
    }
}
