//! Event data model: the marker trait and the type-erased envelope.
//!
//! This module groups the routing contract for published values and the
//! carrier the bus moves through queues and dispatchers.
//!
//! ## Contents
//! - [`Event`] marker trait implemented by every publishable type
//! - [`EventEnvelope`] immutable, cloneable, type-erased payload with
//!   sequencing metadata
//!
//! ## Quick reference
//! - **Producers**: `AsyncEventBus::publish` wraps the typed value into an
//!   envelope; `SyncEventBus::publish` does the same for the pull-based bus.
//! - **Consumers**: queues store envelopes, dispatchers hand them to erased
//!   subscribers, typed adapters downcast back to the concrete event type.

mod envelope;

pub use envelope::{Event, EventEnvelope};
