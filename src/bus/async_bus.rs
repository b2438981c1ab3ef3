//! # AsyncEventBus: typed publish/subscribe front-end.
//!
//! The bus owns the registry mapping event type → [`Consumer`], routes
//! publishes to the matching consumer's queue, and coordinates shutdown of
//! every dispatch loop through one shared [`CancellationToken`].
//!
//! ## Data flow
//! ```text
//! publish(E) ──► registry lookup ──► Consumer::enqueue ──► queue ──► loop
//!                     │ (none)
//!                     └──► event dropped (documented no-op)
//!
//! add_subscriber(E) ──► get-or-create consumer (lock, re-check, insert)
//!                          └── on create: spawn Consumer::run(shared token)
//!
//! shutdown() ──► cancel shared token ──► await every run loop
//! ```
//!
//! ## Rules
//! - One consumer per event type, created at most once (re-checked under
//!   the registry lock).
//! - Publishing a type with no consumer drops the event silently; the
//!   publisher never blocks and never observes delivery failures.
//! - The registry grows monotonically; consumers are only torn down by
//!   shutdown.
//! - Publishing or subscribing after `shutdown` is unspecified.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::BusConfig;
use crate::core::Consumer;
use crate::dispatch::DispatcherFactory;
use crate::error::BusError;
use crate::events::{Event, EventEnvelope};
use crate::queue::QueueFactory;
use crate::subscribers::{EventSubscriber, Subscribe, TypedSubscriber};

/// Process-wide typed event bus with per-type dispatch loops.
///
/// Construct through [`AsyncEventBusBuilder`](crate::AsyncEventBusBuilder);
/// the bus itself never supplies default collaborators.
///
/// `add_subscriber` must be called from within a tokio runtime: creating a
/// consumer spawns its dispatch loop.
pub struct AsyncEventBus {
    queue_factory: QueueFactory,
    dispatcher_factory: DispatcherFactory,
    config: BusConfig,
    consumers: Mutex<HashMap<TypeId, Arc<Consumer>>>,
    loops: Mutex<Vec<JoinHandle<Result<(), BusError>>>>,
    token: CancellationToken,
}

impl AsyncEventBus {
    /// Wires the bus from its required collaborators (builder-only).
    pub(crate) fn new(
        queue_factory: QueueFactory,
        dispatcher_factory: DispatcherFactory,
        config: BusConfig,
    ) -> Self {
        Self {
            queue_factory,
            dispatcher_factory,
            config,
            consumers: Mutex::new(HashMap::new()),
            loops: Mutex::new(Vec::new()),
            token: CancellationToken::new(),
        }
    }

    /// Publishes an event to the consumer registered for its type.
    ///
    /// Non-blocking and infallible: when no subscriber has registered for
    /// `E` yet, there is no consumer and the event is dropped. This is
    /// documented behavior, not an error.
    pub fn publish<E: Event>(&self, event: E) {
        let consumer = {
            let consumers = self
                .consumers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            consumers.get(&TypeId::of::<E>()).cloned()
        };

        let Some(consumer) = consumer else {
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

    /// Registers a subscriber for events of type `E`.
    ///
    /// Locates or lazily creates the consumer for `E`; on creation, spawns
    /// its dispatch loop under the bus's shared cancellation scope. The
    /// subscriber receives every event of type `E` dispatched after this
    /// call completes.
    pub fn add_subscriber<E: Event>(&self, subscriber: Arc<dyn Subscribe<E>>) {
        if self.config.debug_logging {
            debug!(
                subscriber = subscriber.name(),
                event_type = std::any::type_name::<E>(),
                "adding subscriber"
            );
        }

        let erased: Arc<dyn EventSubscriber> = Arc::new(TypedSubscriber::new(subscriber));
        let consumer = self.get_or_create_consumer::<E>();
        consumer.add_subscriber(erased);
    }

    /// Initiates a graceful shutdown: cancels every consumer loop and
    /// awaits their completion.
    ///
    /// Safe to call more than once; later calls find nothing left to await.
    /// Returns the first queue-contract violation surfaced by a loop, if
    /// any (every failure is also logged).
    pub async fn shutdown(&self) -> Result<(), BusError> {
        self.token.cancel();

        let handles: Vec<JoinHandle<Result<(), BusError>>> = {
            let mut loops = self.loops.lock().unwrap_or_else(PoisonError::into_inner);
            loops.drain(..).collect()
        };

        let mut first_failure = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(error = %err, label = err.as_label(), "consumer loop failed");
                    first_failure.get_or_insert(err);
                }
                Err(join_err) => {
                    error!(error = %join_err, "consumer loop panicked");
                }
            }
        }

        if self.config.debug_logging {
            debug!("event bus shutdown complete");
        }
        match first_failure {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Retrieves the consumer for `E`, creating and starting it on first
    /// use.
    ///
    /// Check-then-create: the registry lock is held only for the lookup and
    /// the insert, with a re-check in between so a racing creation never
    /// yields two consumers for one type.
    fn get_or_create_consumer<E: Event>(&self) -> Arc<Consumer> {
        let type_id = TypeId::of::<E>();

        {
            let consumers = self
                .consumers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(consumer) = consumers.get(&type_id) {
                return Arc::clone(consumer);
            }
        }

        let queue = (self.queue_factory)();
        let dispatcher = (self.dispatcher_factory)();
        let consumer = Arc::new(Consumer::new::<E>(queue, dispatcher, &self.config));

        let mut consumers = self
            .consumers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = consumers.get(&type_id) {
            return Arc::clone(existing);
        }
        consumers.insert(type_id, Arc::clone(&consumer));

        let handle = tokio::spawn(Arc::clone(&consumer).run(self.token.clone()));
        self.loops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);

        if self.config.debug_logging {
            debug!(
                event_type = std::any::type_name::<E>(),
                "created consumer"
            );
        }
        consumer
    }
}
