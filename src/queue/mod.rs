//! Per-type event queues.
//!
//! Every consumer owns one queue holding pending envelopes of its event
//! type. The queue is a seam: the bus builder takes a [`QueueFactory`] and
//! invokes it once per consumer, so custom implementations (bounded,
//! instrumented, test doubles) can be plugged in.
//!
//! ## Contents
//! - [`EventQueue`] trait: non-blocking enqueue, non-blocking FIFO poll
//! - [`FifoEventQueue`] default unbounded implementation
//! - [`QueueFactory`] boxed constructor used by the bus

mod fifo;

pub use fifo::{EventQueue, FifoEventQueue};

/// Constructor invoked once per consumer to build its queue.
pub type QueueFactory = Box<dyn Fn() -> Box<dyn EventQueue> + Send + Sync>;
