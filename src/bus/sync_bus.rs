//! # SyncEventBus: single-threaded, pull-based variant.
//!
//! Same routing model as [`AsyncEventBus`](crate::AsyncEventBus) — one
//! consumer per event type, lazy creation on first subscription, silent
//! drop for unregistered publishes — but no loops and no runtime: the
//! caller drains all queues explicitly with
//! [`SyncEventBus::consume_events`], and handlers run inline on the
//! calling thread.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::BusConfig;
use crate::core::SyncConsumer;
use crate::dispatch::{DispatchSync, SyncDispatcherFactory, SyncFanOutDispatcher};
use crate::error::BusError;
use crate::events::{Event, EventEnvelope};
use crate::queue::{EventQueue, FifoEventQueue, QueueFactory};
use crate::subscribers::{SubscribeSync, SyncEventSubscriber, SyncTypedSubscriber};

/// Pull-based typed event bus.
///
/// Exclusive-access API (`&mut self`); intended for single-threaded use.
pub struct SyncEventBus {
    queue_factory: QueueFactory,
    dispatcher_factory: SyncDispatcherFactory,
    config: BusConfig,
    consumers: HashMap<TypeId, SyncConsumer>,
}

impl SyncEventBus {
    /// Wires the bus from its required collaborators (builder-only).
    pub(crate) fn new(
        queue_factory: QueueFactory,
        dispatcher_factory: SyncDispatcherFactory,
        config: BusConfig,
    ) -> Self {
        Self {
            queue_factory,
            dispatcher_factory,
            config,
            consumers: HashMap::new(),
        }
    }

    /// Enqueues an event for the consumer registered for its type.
    ///
    /// When no subscriber has registered for `E`, the event is dropped
    /// silently (documented behavior, not an error).
    pub fn publish<E: Event>(&mut self, event: E) {
        let Some(consumer) = self.consumers.get(&TypeId::of::<E>()) else {
            if self.config.debug_logging {
                debug!(
                    event_type = std::any::type_name::<E>(),
                    "no consumer for published event type, dropping"
                );
            }
            return;
        };
        consumer.enqueue(EventEnvelope::new(event));
    }

    /// Registers a subscriber for events of type `E`, creating the
    /// consumer on first use.
    pub fn add_subscriber<E: Event>(&mut self, subscriber: Arc<dyn SubscribeSync<E>>) {
        let type_id = TypeId::of::<E>();
        if !self.consumers.contains_key(&type_id) {
            let queue = (self.queue_factory)();
            let dispatcher = (self.dispatcher_factory)();
            self.consumers
                .insert(type_id, SyncConsumer::new::<E>(queue, dispatcher));
            if self.config.debug_logging {
                debug!(
                    event_type = std::any::type_name::<E>(),
                    "created consumer"
                );
            }
        }

        let erased: Arc<dyn SyncEventSubscriber> = Arc::new(SyncTypedSubscriber::new(subscriber));
        if let Some(consumer) = self.consumers.get_mut(&type_id) {
            consumer.add_subscriber(erased);
        }
    }

    /// Drains every consumer's queue, dispatching pending events inline.
    ///
    /// Events of one type are delivered in FIFO publish order. Fails only
    /// on a queue-contract violation.
    pub fn consume_events(&mut self) -> Result<(), BusError> {
        for consumer in self.consumers.values_mut() {
            consumer.consume_events()?;
        }
        Ok(())
    }
}

/// Builder for [`SyncEventBus`]; same fail-fast contract as
/// [`AsyncEventBusBuilder`](crate::AsyncEventBusBuilder).
#[derive(Default)]
pub struct SyncEventBusBuilder {
    queue_factory: Option<QueueFactory>,
    dispatcher_factory: Option<SyncDispatcherFactory>,
    config: Option<BusConfig>,
}

impl SyncEventBusBuilder {
    /// Creates an empty builder; every collaborator must be supplied before
    /// `build`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled with the default collaborators.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_queue_factory(|| Box::new(FifoEventQueue::new()))
            .with_dispatcher_factory(|| Box::new(SyncFanOutDispatcher::new()))
            .with_config(BusConfig::default())
    }

    /// Sets the factory invoked once per consumer to build its queue.
    #[must_use]
    pub fn with_queue_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn EventQueue> + Send + Sync + 'static,
    {
        self.queue_factory = Some(Box::new(factory));
        self
    }

    /// Sets the factory invoked once per consumer to build its dispatcher.
    #[must_use]
    pub fn with_dispatcher_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn DispatchSync> + Send + Sync + 'static,
    {
        self.dispatcher_factory = Some(Box::new(factory));
        self
    }

    /// Sets the bus configuration.
    #[must_use]
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the bus, failing fast on any missing collaborator.
    pub fn build(self) -> Result<SyncEventBus, BusError> {
        let queue_factory = self.queue_factory.ok_or(BusError::MissingQueueFactory)?;
        let dispatcher_factory = self
            .dispatcher_factory
            .ok_or(BusError::MissingDispatcherFactory)?;
        let config = self.config.ok_or(BusError::MissingConfiguration)?;

        Ok(SyncEventBus::new(queue_factory, dispatcher_factory, config))
    }
}
