//! # Consumer: per-event-type delivery engine.
//!
//! One [`Consumer`] exists per published event type. It owns the type's
//! queue, its subscriber set, its dispatcher instance, and the loop that
//! drains the queue into bounded-concurrency dispatch tasks.
//!
//! ## Architecture
//! ```text
//! publishers ── enqueue() ──► queue ──┐            wake (counting semaphore)
//!                    └── add_permits(1) ───────────────┘
//!                                     │
//!                               run(token) loop:
//!                                 ├─► wait for wake permit   (Idle)
//!                                 ├─► drain: try_dequeue     (Draining)
//!                                 │     ├─► verify envelope type (fatal on mismatch)
//!                                 │     ├─► acquire limiter permit (≤ N in flight)
//!                                 │     └─► spawn dispatch(event, snapshot)
//!                                 └─► on cancel: stop admitting, (ShuttingDown)
//!                                     join in-flight dispatches, exit (Stopped)
//! ```
//!
//! ## Rules
//! - The wake signal is **counting**: one permit per enqueue. Enqueues that
//!   land while the loop is draining are never missed; surplus permits only
//!   cause cheap empty drain passes.
//! - Dispatch **start** order follows dequeue order (FIFO per type);
//!   completion order is unordered.
//! - At most `max_concurrency` dispatches run at once. Each dispatch fans
//!   out to the subscriber snapshot taken at spawn time.
//! - A handler failure is absorbed by the dispatcher; a queue handing back
//!   an envelope of a foreign type is fatal and ends the loop with
//!   [`BusError::QueueContract`].

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::BusConfig;
use crate::core::monitor;
use crate::dispatch::Dispatch;
use crate::error::BusError;
use crate::events::{Event, EventEnvelope};
use crate::queue::EventQueue;
use crate::subscribers::{EventSubscriber, SubscriberSet};

/// Per-type queue owner and dispatch loop.
///
/// Created lazily by the bus on first subscription for a type; its `run`
/// loop is spawned once under the bus's shared cancellation token and lives
/// until shutdown.
pub(crate) struct Consumer {
    queue: Box<dyn EventQueue>,
    dispatcher: Box<dyn Dispatch>,
    subscribers: SubscriberSet,

    /// Counting wake signal: starts at zero permits, one added per enqueue.
    wake: Semaphore,

    event_type: TypeId,
    type_name: &'static str,

    max_concurrency: usize,
    debug_logging: bool,
    monitor_interval: Duration,

    dequeued: AtomicU64,
    completed: AtomicU64,
    in_flight: AtomicUsize,
}

impl Consumer {
    /// Creates a consumer owning events of type `E`.
    pub(crate) fn new<E: Event>(
        queue: Box<dyn EventQueue>,
        dispatcher: Box<dyn Dispatch>,
        config: &BusConfig,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            subscribers: SubscriberSet::new(),
            wake: Semaphore::new(0),
            event_type: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            max_concurrency: config.max_concurrency_clamped(),
            debug_logging: config.debug_logging,
            monitor_interval: config.monitor_interval,
            dequeued: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Pushes an envelope and wakes the loop.
    ///
    /// Non-blocking; called from arbitrary publisher tasks.
    pub(crate) fn enqueue(&self, envelope: EventEnvelope) {
        self.queue.enqueue(envelope);
        self.wake.add_permits(1);
    }

    /// Publishes an updated subscriber snapshot (copy-on-write append).
    ///
    /// Dispatches already in flight keep the snapshot they started with;
    /// dispatches admitted afterwards observe the new subscriber.
    pub(crate) fn add_subscriber(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.add(subscriber);
    }

    /// Runs the dispatch loop until `token` is cancelled or the queue
    /// violates its contract.
    ///
    /// ### Exit semantics
    /// On cancellation the loop stops admitting new dequeues immediately,
    /// awaits completion of every in-flight dispatch, and returns `Ok(())`.
    /// A queue-contract violation follows the same wind-down but returns
    /// the error so the bus can surface it at shutdown.
    pub(crate) async fn run(self: Arc<Self>, token: CancellationToken) -> Result<(), BusError> {
        let limiter = Arc::new(Semaphore::new(self.max_concurrency));
        let mut inflight = JoinSet::new();

        let monitor_token = token.child_token();
        let monitor = self.debug_logging.then(|| {
            debug!(event_type = self.type_name, "consumer started");
            tokio::spawn(monitor::run(Arc::clone(&self), monitor_token.clone()))
        });

        let result = loop {
            tokio::select! {
                _ = token.cancelled() => break Ok(()),
                permit = self.wake.acquire() => {
                    match permit {
                        Ok(permit) => permit.forget(),
                        // The wake semaphore is never closed; treat it as shutdown.
                        Err(_) => break Ok(()),
                    }
                    if let Err(err) = self.drain(&token, &limiter, &mut inflight).await {
                        break Err(err);
                    }
                }
            }
        };

        // No new admissions past this point; wait out in-flight dispatches.
        while inflight.join_next().await.is_some() {}

        monitor_token.cancel();
        if let Some(handle) = monitor {
            let _ = handle.await;
        }
        if self.debug_logging {
            debug!(event_type = self.type_name, "consumer stopped");
        }
        result
    }

    /// Drains the queue, spawning one bounded dispatch task per envelope.
    async fn drain(
        self: &Arc<Self>,
        token: &CancellationToken,
        limiter: &Arc<Semaphore>,
        inflight: &mut JoinSet<()>,
    ) -> Result<(), BusError> {
        while let Some(envelope) = self.queue.try_dequeue() {
            if envelope.event_type() != self.event_type {
                return Err(BusError::QueueContract {
                    expected: self.type_name,
                    found: envelope.type_name(),
                });
            }

            let permit = tokio::select! {
                // Cancelled while waiting for a slot: stop admitting.
                _ = token.cancelled() => return Ok(()),
                permit = Arc::clone(limiter).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return Ok(()),
                },
            };

            self.dequeued.fetch_add(1, Ordering::Relaxed);
            self.in_flight.fetch_add(1, Ordering::Relaxed);

            let consumer = Arc::clone(self);
            let snapshot = self.subscribers.snapshot();
            let mut task = Box::pin(async move {
                let _permit = permit;
                let fut = consumer.dispatcher.dispatch(&envelope, snapshot.as_slice());
                if std::panic::AssertUnwindSafe(fut).catch_unwind().await.is_err() {
                    error!(
                        event_type = consumer.type_name,
                        seq = envelope.seq(),
                        "dispatcher panicked during dispatch"
                    );
                }
                consumer.in_flight.fetch_sub(1, Ordering::Relaxed);
                consumer.completed.fetch_add(1, Ordering::Relaxed);
            });

            // Run the dispatch up to its first suspension point inline, so
            // the dispatcher is invoked in dequeue order; only a still-pending
            // remainder is handed to the scheduler.
            if futures::poll!(task.as_mut()).is_pending() {
                inflight.spawn(task);
            }

            // Reap finished dispatches so the set does not grow with the queue.
            while inflight.try_join_next().is_some() {}
        }
        Ok(())
    }

    // ---- Progress accessors (monitor) ----

    pub(crate) fn type_label(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn monitor_interval(&self) -> Duration {
        self.monitor_interval
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub(crate) fn dequeued_total(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    pub(crate) fn completed_total(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::dispatch::FanOutDispatcher;
    use crate::error::HandlerError;
    use crate::queue::FifoEventQueue;

    struct Numbered(u64);
    impl Event for Numbered {}

    struct Other;
    impl Event for Other {}

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl EventSubscriber for Recorder {
        async fn on_event(&self, envelope: &EventEnvelope) -> Result<(), HandlerError> {
            let n = envelope
                .downcast_ref::<Numbered>()
                .map(|e| e.0)
                .ok_or_else(|| HandlerError::fail("wrong type"))?;
            self.seen.lock().unwrap().push(n);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn consumer_for_numbered(max_concurrency: usize) -> Arc<Consumer> {
        let mut config = BusConfig::default();
        config.max_concurrency = max_concurrency;
        Arc::new(Consumer::new::<Numbered>(
            Box::new(FifoEventQueue::new()),
            Box::new(FanOutDispatcher::new()),
            &config,
        ))
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..500 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within deadline");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fifo_delivery_with_serial_admission() {
        let consumer = consumer_for_numbered(1);
        let recorder = Arc::new(Recorder::default());
        consumer.add_subscriber(Arc::clone(&recorder) as Arc<dyn EventSubscriber>);

        let token = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&consumer).run(token.clone()));

        for i in 0..10 {
            consumer.enqueue(EventEnvelope::new(Numbered(i)));
        }

        let r = Arc::clone(&recorder);
        wait_until(move || r.seen.lock().unwrap().len() == 10).await;

        token.cancel();
        handle.await.unwrap().unwrap();

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    /// Records at handler entry, then parks so several dispatches overlap.
    struct SlowRecorder {
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl EventSubscriber for SlowRecorder {
        async fn on_event(&self, envelope: &EventEnvelope) -> Result<(), HandlerError> {
            let n = envelope
                .downcast_ref::<Numbered>()
                .map(|e| e.0)
                .ok_or_else(|| HandlerError::fail("wrong type"))?;
            self.seen.lock().unwrap().push(n);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "slow-recorder"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dispatch_starts_in_fifo_order_with_concurrent_admission() {
        let consumer = consumer_for_numbered(4);
        let recorder = Arc::new(SlowRecorder {
            seen: Mutex::new(Vec::new()),
        });
        consumer.add_subscriber(Arc::clone(&recorder) as Arc<dyn EventSubscriber>);

        let token = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&consumer).run(token.clone()));

        for i in 0..12 {
            consumer.enqueue(EventEnvelope::new(Numbered(i)));
        }

        let r = Arc::clone(&recorder);
        wait_until(move || r.seen.lock().unwrap().len() == 12).await;

        token.cancel();
        handle.await.unwrap().unwrap();

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen, (0..12).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_drains_in_flight_and_stops() {
        let consumer = consumer_for_numbered(2);
        let recorder = Arc::new(Recorder::default());
        consumer.add_subscriber(Arc::clone(&recorder) as Arc<dyn EventSubscriber>);

        let token = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&consumer).run(token.clone()));

        consumer.enqueue(EventEnvelope::new(Numbered(1)));
        token.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_foreign_envelope_is_fatal() {
        let consumer = consumer_for_numbered(2);
        let token = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&consumer).run(token.clone()));

        consumer.enqueue(EventEnvelope::new(Other));

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.as_label(), "queue_contract_violation");
    }
}
