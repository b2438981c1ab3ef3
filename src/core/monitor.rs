//! # Consumer progress monitor.
//!
//! When `BusConfig::debug_logging` is enabled, every consumer spawns one
//! monitor task that emits a structured progress line at a fixed interval:
//! subscriber count, queue depth, in-flight dispatches, and per-second
//! dequeue/completion rates. Purely observational; no behavioral effect.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Consumer;

/// Logs consumer progress every `monitor_interval` until cancelled.
pub(crate) async fn run(consumer: Arc<Consumer>, token: CancellationToken) {
    let mut ticker = time::interval(consumer.monitor_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval fires immediately; consume it so every
    // logged rate covers a full interval.
    ticker.tick().await;

    let mut last_dequeued = consumer.dequeued_total();
    let mut last_completed = consumer.completed_total();
    let mut last_at = Instant::now();

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let dequeued = consumer.dequeued_total();
        let completed = consumer.completed_total();
        let elapsed = last_at.elapsed().as_secs_f64().max(f64::EPSILON);

        debug!(
            event_type = consumer.type_label(),
            subscribers = consumer.subscriber_count(),
            queue_depth = consumer.queue_depth(),
            in_flight = consumer.in_flight(),
            events_per_sec = (dequeued - last_dequeued) as f64 / elapsed,
            completed_per_sec = (completed - last_completed) as f64 / elapsed,
            "consumer progress"
        );

        last_dequeued = dequeued;
        last_completed = completed;
        last_at = Instant::now();
    }
}
