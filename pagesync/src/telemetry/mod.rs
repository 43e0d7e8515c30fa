//! Telemetry events for observability of remote calls.
//!
//! The core never ships telemetry anywhere itself. It describes what happened
//! as a [`TelemetryEvent`] and hands it to an [`EventSink`] supplied by the
//! host. Two sinks ship with the crate:
//!
//! - [`TracingSink`] forwards events to `tracing`, the default when the host
//!   has no telemetry pipeline of its own
//! - [`MemorySink`] keeps events in memory for inspection
//!
//! # Architecture
//!
//! ```text
//! Resolver / PolicyClient / EntityFetcher ─────► EventSink ─────► host pipeline
//!                                                (emit)           (logs, MemorySink, ...)
//! ```
//!
//! # Example
//!
//! ```
//! use pagesync::telemetry::{EventSink, MemorySink, TelemetryEvent};
//!
//! let sink = MemorySink::new();
//! sink.emit(TelemetryEvent::ApiRequest { url: "https://org.example/api".into() });
//! assert_eq!(sink.snapshot().len(), 1);
//! ```

mod event;
mod sink;

pub use event::TelemetryEvent;
pub use sink::{EventSink, MemorySink, SharedSink, TracingSink};
