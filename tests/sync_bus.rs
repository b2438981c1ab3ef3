//! Tests for the pull-based bus variant (`sync` feature).

#![cfg(feature = "sync")]

use std::sync::{Arc, Mutex};

use typebus::{Event, HandlerError, SubscribeSync, SyncEventBusBuilder};

struct OrderPlaced {
    n: u64,
}
impl Event for OrderPlaced {}

struct Unrouted;
impl Event for Unrouted {}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<u64>>,
}

impl SubscribeSync<OrderPlaced> for Recorder {
    fn on_event(&self, event: &OrderPlaced) -> Result<(), HandlerError> {
        self.seen.lock().unwrap().push(event.n);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

struct Failing;

impl SubscribeSync<OrderPlaced> for Failing {
    fn on_event(&self, _event: &OrderPlaced) -> Result<(), HandlerError> {
        Err(HandlerError::fail("always fails"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[test]
fn test_publish_then_consume_delivers_fifo_to_all_subscribers() {
    let mut bus = SyncEventBusBuilder::with_defaults().build().unwrap();

    let a = Arc::new(Recorder::default());
    let b = Arc::new(Recorder::default());
    bus.add_subscriber::<OrderPlaced>(Arc::clone(&a) as _);
    bus.add_subscriber::<OrderPlaced>(Arc::clone(&b) as _);

    for n in 0..5 {
        bus.publish(OrderPlaced { n });
    }
    bus.consume_events().unwrap();

    assert_eq!(*a.seen.lock().unwrap(), (0..5).collect::<Vec<_>>());
    assert_eq!(*b.seen.lock().unwrap(), (0..5).collect::<Vec<_>>());
}

#[test]
fn test_events_published_before_subscription_reach_later_consume() {
    let mut bus = SyncEventBusBuilder::with_defaults().build().unwrap();

    let recorder = Arc::new(Recorder::default());
    bus.add_subscriber::<OrderPlaced>(Arc::clone(&recorder) as _);
    bus.publish(OrderPlaced { n: 1 });

    // Not yet consumed: nothing delivered.
    assert!(recorder.seen.lock().unwrap().is_empty());

    bus.consume_events().unwrap();
    assert_eq!(*recorder.seen.lock().unwrap(), vec![1]);

    // Drained: a second consume is a no-op.
    bus.consume_events().unwrap();
    assert_eq!(*recorder.seen.lock().unwrap(), vec![1]);
}

#[test]
fn test_unregistered_publish_is_a_noop() {
    let mut bus = SyncEventBusBuilder::with_defaults().build().unwrap();
    bus.publish(Unrouted);
    bus.consume_events().unwrap();
}

#[test]
fn test_failing_subscriber_does_not_suppress_siblings() {
    let mut bus = SyncEventBusBuilder::with_defaults().build().unwrap();

    let recorder = Arc::new(Recorder::default());
    bus.add_subscriber::<OrderPlaced>(Arc::new(Failing) as _);
    bus.add_subscriber::<OrderPlaced>(Arc::clone(&recorder) as _);

    bus.publish(OrderPlaced { n: 7 });
    bus.consume_events().unwrap();

    assert_eq!(*recorder.seen.lock().unwrap(), vec![7]);
}

#[test]
fn test_builder_requires_all_collaborators() {
    let err = SyncEventBusBuilder::new().build().map(drop).unwrap_err();
    assert_eq!(err.as_label(), "missing_queue_factory");
}
