//! # Fan-out dispatcher.
//!
//! [`FanOutDispatcher`] starts every subscriber's handler for one event,
//! runs them concurrently, and returns only once all of them have finished.
//!
//! ## Rules
//! - A handler error or panic is logged with the subscriber's name and
//!   **never** affects sibling handlers nor propagates to the caller.
//! - No ordering is guaranteed between handlers of the same event.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use tracing::warn;

use crate::error::HandlerError;
use crate::events::EventEnvelope;
use crate::subscribers::EventSubscriber;

#[cfg(feature = "sync")]
use crate::subscribers::SyncEventSubscriber;

/// Stateless delivery primitive: one event, one subscriber snapshot.
///
/// Completion signals that **all** handlers have completed or failed.
/// Implementations must absorb per-handler failures; only the consumer's
/// own machinery may fail a dispatch loop.
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    /// Delivers `envelope` to every subscriber in `subscribers`.
    async fn dispatch(&self, envelope: &EventEnvelope, subscribers: &[Arc<dyn EventSubscriber>]);
}

/// Default dispatcher: concurrent fan-out with panic isolation.
#[derive(Default)]
pub struct FanOutDispatcher;

impl FanOutDispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dispatch for FanOutDispatcher {
    async fn dispatch(&self, envelope: &EventEnvelope, subscribers: &[Arc<dyn EventSubscriber>]) {
        let handlers = subscribers.iter().map(|subscriber| async move {
            let fut = subscriber.on_event(envelope);
            match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(
                        subscriber = subscriber.name(),
                        event_type = envelope.type_name(),
                        seq = envelope.seq(),
                        error = %err,
                        "subscriber handler failed"
                    );
                }
                Err(payload) => {
                    let err = HandlerError::Panicked {
                        info: panic_info(payload.as_ref()),
                    };
                    warn!(
                        subscriber = subscriber.name(),
                        event_type = envelope.type_name(),
                        seq = envelope.seq(),
                        error = %err,
                        "subscriber handler panicked"
                    );
                }
            }
        });
        join_all(handlers).await;
    }
}

/// Renders a caught panic payload as text.
fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Synchronous delivery primitive (pull-based bus variant).
#[cfg(feature = "sync")]
pub trait DispatchSync: Send + Sync + 'static {
    /// Delivers `envelope` to every subscriber in `subscribers`, in order.
    fn dispatch(&self, envelope: &EventEnvelope, subscribers: &[Arc<dyn SyncEventSubscriber>]);
}

/// Default synchronous dispatcher: sequential invocation, failures absorbed.
#[cfg(feature = "sync")]
#[derive(Default)]
pub struct SyncFanOutDispatcher;

#[cfg(feature = "sync")]
impl SyncFanOutDispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "sync")]
impl DispatchSync for SyncFanOutDispatcher {
    fn dispatch(&self, envelope: &EventEnvelope, subscribers: &[Arc<dyn SyncEventSubscriber>]) {
        for subscriber in subscribers {
            if let Err(err) = subscriber.on_event(envelope) {
                warn!(
                    subscriber = subscriber.name(),
                    event_type = envelope.type_name(),
                    seq = envelope.seq(),
                    error = %err,
                    "subscriber handler failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::events::Event;

    struct Ping;
    impl Event for Ping {}

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl EventSubscriber for Counting {
        async fn on_event(&self, _envelope: &EventEnvelope) -> Result<(), HandlerError> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct Failing;

    #[async_trait]
    impl EventSubscriber for Failing {
        async fn on_event(&self, _envelope: &EventEnvelope) -> Result<(), HandlerError> {
            Err(HandlerError::fail("always fails"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Panicking;

    #[async_trait]
    impl EventSubscriber for Panicking {
        async fn on_event(&self, _envelope: &EventEnvelope) -> Result<(), HandlerError> {
            panic!("handler exploded");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_all_subscribers_invoked() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let subs: Vec<Arc<dyn EventSubscriber>> = vec![Arc::clone(&a) as _, Arc::clone(&b) as _];

        FanOutDispatcher::new()
            .dispatch(&EventEnvelope::new(Ping), &subs)
            .await;

        assert_eq!(a.0.load(Ordering::Relaxed), 1);
        assert_eq!(b.0.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_suppress_siblings() {
        let ok = Arc::new(Counting::default());
        let subs: Vec<Arc<dyn EventSubscriber>> = vec![
            Arc::new(Failing) as _,
            Arc::new(Panicking) as _,
            Arc::clone(&ok) as _,
        ];

        let dispatcher = FanOutDispatcher::new();
        dispatcher.dispatch(&EventEnvelope::new(Ping), &subs).await;
        dispatcher.dispatch(&EventEnvelope::new(Ping), &subs).await;

        assert_eq!(ok.0.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_empty_subscriber_list_completes() {
        FanOutDispatcher::new()
            .dispatch(&EventEnvelope::new(Ping), &[])
            .await;
    }
}
