//! # Synchronous consumer (pull-based bus variant).
//!
//! The sync twin of [`Consumer`](super::Consumer): same queue ownership and
//! per-type routing, but no loop of its own. The owning bus calls
//! [`SyncConsumer::consume_events`] to drain the queue inline, dispatching
//! each envelope to the subscribers sequentially.

use std::any::TypeId;
use std::sync::Arc;

use crate::dispatch::DispatchSync;
use crate::error::BusError;
use crate::events::{Event, EventEnvelope};
use crate::queue::EventQueue;
use crate::subscribers::SyncEventSubscriber;

/// Per-type queue owner for the pull-based bus.
pub(crate) struct SyncConsumer {
    queue: Box<dyn EventQueue>,
    dispatcher: Box<dyn DispatchSync>,
    subscribers: Vec<Arc<dyn SyncEventSubscriber>>,
    event_type: TypeId,
    type_name: &'static str,
}

impl SyncConsumer {
    /// Creates a consumer owning events of type `E`.
    pub(crate) fn new<E: Event>(
        queue: Box<dyn EventQueue>,
        dispatcher: Box<dyn DispatchSync>,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            subscribers: Vec::new(),
            event_type: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Pushes an envelope; delivery happens on the next `consume_events`.
    pub(crate) fn enqueue(&self, envelope: EventEnvelope) {
        self.queue.enqueue(envelope);
    }

    /// Registers a subscriber for this consumer's event type.
    pub(crate) fn add_subscriber(&mut self, subscriber: Arc<dyn SyncEventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Drains the queue, dispatching every pending envelope in FIFO order.
    ///
    /// Fails only on a queue-contract violation (foreign envelope type);
    /// handler failures are absorbed by the dispatcher.
    pub(crate) fn consume_events(&mut self) -> Result<(), BusError> {
        while let Some(envelope) = self.queue.try_dequeue() {
            if envelope.event_type() != self.event_type {
                return Err(BusError::QueueContract {
                    expected: self.type_name,
                    found: envelope.type_name(),
                });
            }
            self.dispatcher.dispatch(&envelope, &self.subscribers);
        }
        Ok(())
    }
}
