//! # FIFO event queue.
//!
//! [`FifoEventQueue`] is the default [`EventQueue`]: an unbounded,
//! mutex-guarded `VecDeque`. The lock is held only for the push/pop itself,
//! so concurrent producers never contend with an in-flight dispatch.
//!
//! ## Rules
//! - **Never blocks, never fails**: `enqueue` always accepts the envelope.
//! - **FIFO**: `try_dequeue` returns envelopes in enqueue order.
//! - **Single logical consumer**: exactly one loop polls `try_dequeue`;
//!   producers may be many.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::events::EventEnvelope;

/// Unbounded FIFO of pending events for one consumer.
///
/// Implementations must never reorder or drop envelopes between `enqueue`
/// and `try_dequeue`, and must only yield envelopes that were enqueued on
/// this instance. A consumer treats a foreign envelope as a fatal
/// [`BusError::QueueContract`](crate::BusError::QueueContract) failure.
pub trait EventQueue: Send + Sync + 'static {
    /// Appends an envelope. Non-blocking, infallible.
    fn enqueue(&self, envelope: EventEnvelope);

    /// Removes and returns the oldest envelope, or `None` when empty.
    /// Non-blocking.
    fn try_dequeue(&self) -> Option<EventEnvelope>;

    /// Number of pending envelopes.
    fn len(&self) -> usize;

    /// True when no envelopes are pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default unbounded FIFO queue.
#[derive(Default)]
pub struct FifoEventQueue {
    inner: Mutex<VecDeque<EventEnvelope>>,
}

impl FifoEventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventQueue for FifoEventQueue {
    fn enqueue(&self, envelope: EventEnvelope) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(envelope);
    }

    fn try_dequeue(&self) -> Option<EventEnvelope> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
