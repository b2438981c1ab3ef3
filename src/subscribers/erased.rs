//! # Type erasure between typed subscribers and the dispatch plumbing.
//!
//! Consumers and dispatchers are untyped: they move [`EventEnvelope`]s and
//! hold `Arc<dyn EventSubscriber>` handles. [`TypedSubscriber`] bridges the
//! gap by downcasting the envelope back to the concrete event type before
//! invoking the user's [`Subscribe`] implementation.
//!
//! A downcast can only fail when an envelope of a foreign type reaches the
//! subscriber, which the owning consumer already treats as a fatal queue
//! fault; the adapter still reports it as a handler failure rather than
//! panicking.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::{Event, EventEnvelope};

use super::subscribe::Subscribe;
#[cfg(feature = "sync")]
use super::subscribe::SubscribeSync;

/// Object-safe subscriber handle stored by consumers and handed to
/// dispatchers.
///
/// Users normally implement [`Subscribe`] instead and let the bus wrap it;
/// implementing this trait directly is only needed for subscribers that
/// want to observe the raw envelope (sequence numbers, timestamps).
#[async_trait]
pub trait EventSubscriber: Send + Sync + 'static {
    /// Handles one type-erased event.
    async fn on_event(&self, envelope: &EventEnvelope) -> Result<(), HandlerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Adapter that presents a typed [`Subscribe`] as an [`EventSubscriber`].
pub struct TypedSubscriber<E: Event> {
    inner: Arc<dyn Subscribe<E>>,
}

impl<E: Event> TypedSubscriber<E> {
    /// Wraps a typed subscriber.
    pub fn new(inner: Arc<dyn Subscribe<E>>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<E: Event> EventSubscriber for TypedSubscriber<E> {
    async fn on_event(&self, envelope: &EventEnvelope) -> Result<(), HandlerError> {
        match envelope.downcast_ref::<E>() {
            Some(event) => self.inner.on_event(event).await,
            None => Err(HandlerError::fail(format!(
                "event type mismatch: subscriber expects {}, envelope carries {}",
                std::any::type_name::<E>(),
                envelope.type_name()
            ))),
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Object-safe synchronous subscriber handle (pull-based bus variant).
#[cfg(feature = "sync")]
pub trait SyncEventSubscriber: Send + Sync + 'static {
    /// Handles one type-erased event.
    fn on_event(&self, envelope: &EventEnvelope) -> Result<(), HandlerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Adapter that presents a typed [`SubscribeSync`] as a
/// [`SyncEventSubscriber`].
#[cfg(feature = "sync")]
pub struct SyncTypedSubscriber<E: Event> {
    inner: Arc<dyn SubscribeSync<E>>,
}

#[cfg(feature = "sync")]
impl<E: Event> SyncTypedSubscriber<E> {
    /// Wraps a typed synchronous subscriber.
    pub fn new(inner: Arc<dyn SubscribeSync<E>>) -> Self {
        Self { inner }
    }
}

#[cfg(feature = "sync")]
impl<E: Event> SyncEventSubscriber for SyncTypedSubscriber<E> {
    fn on_event(&self, envelope: &EventEnvelope) -> Result<(), HandlerError> {
        match envelope.downcast_ref::<E>() {
            Some(event) => self.inner.on_event(event),
            None => Err(HandlerError::fail(format!(
                "event type mismatch: subscriber expects {}, envelope carries {}",
                std::any::type_name::<E>(),
                envelope.type_name()
            ))),
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Ping(u64);
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    #[derive(Default)]
    struct Sum(AtomicU64);

    #[async_trait]
    impl Subscribe<Ping> for Sum {
        async fn on_event(&self, event: &Ping) -> Result<(), HandlerError> {
            self.0.fetch_add(event.0, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_typed_adapter_downcasts() {
        let sum = Arc::new(Sum::default());
        let erased = TypedSubscriber::new(Arc::clone(&sum) as Arc<dyn Subscribe<Ping>>);

        erased.on_event(&EventEnvelope::new(Ping(40))).await.unwrap();
        erased.on_event(&EventEnvelope::new(Ping(2))).await.unwrap();
        assert_eq!(sum.0.load(Ordering::Relaxed), 42);
    }

    #[tokio::test]
    async fn test_typed_adapter_rejects_foreign_envelope() {
        let sum = Arc::new(Sum::default());
        let erased = TypedSubscriber::new(sum as Arc<dyn Subscribe<Ping>>);

        let err = erased.on_event(&EventEnvelope::new(Pong)).await.unwrap_err();
        assert_eq!(err.as_label(), "handler_failed");
    }
}
