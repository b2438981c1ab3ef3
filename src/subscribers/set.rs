//! # SubscriberSet: copy-on-write subscriber snapshots.
//!
//! [`SubscriberSet`] holds the subscribers of one consumer behind an
//! [`ArcSwap`]. Appends build a new `Vec` and swap it in atomically;
//! readers take a full `Arc` snapshot and keep it for the lifetime of one
//! dispatch.
//!
//! ## What it guarantees
//! - `snapshot()` never blocks and never observes a half-updated list.
//! - A dispatch started before an `add` completes may or may not include
//!   the new subscriber; a dispatch that snapshots afterwards always does.
//!
//! ## What it does **not** guarantee
//! - Removal: the set is append-only for the lifetime of its consumer.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::EventSubscriber;

/// Append-only, copy-on-write collection of erased subscriber handles.
#[derive(Default)]
pub struct SubscriberSet {
    inner: ArcSwap<Vec<Arc<dyn EventSubscriber>>>,
}

impl SubscriberSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber by publishing a new immutable snapshot.
    ///
    /// Concurrent `add` calls retry internally (compare-and-swap loop); no
    /// append is ever lost.
    pub fn add(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.inner.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&subscriber));
            next
        });
    }

    /// Returns the current complete snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Arc<dyn EventSubscriber>>> {
        self.inner.load_full()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::HandlerError;
    use crate::events::EventEnvelope;

    struct Noop;

    #[async_trait]
    impl EventSubscriber for Noop {
        async fn on_event(&self, _envelope: &EventEnvelope) -> Result<(), HandlerError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "noop"
        }
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_adds() {
        let set = SubscriberSet::new();
        set.add(Arc::new(Noop));

        let before = set.snapshot();
        set.add(Arc::new(Noop));
        let after = set.snapshot();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_concurrent_adds_are_never_lost() {
        let set = Arc::new(SubscriberSet::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let s = Arc::clone(&set);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    s.add(Arc::new(Noop));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.len(), 400);
    }

    #[test]
    fn test_empty_set() {
        let set = SubscriberSet::new();
        assert!(set.is_empty());
        assert!(set.snapshot().is_empty());
    }
}
