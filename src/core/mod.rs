//! Runtime core: per-type consumers and their dispatch loops.
//!
//! This module contains the embedded delivery engine of the bus. Nothing
//! here is public API; the bus front-ends in [`crate::bus`] own and drive
//! these types.
//!
//! Internal modules:
//! - [`consumer`]: one queue + subscriber set + bounded-concurrency dispatch
//!   loop per event type;
//! - [`monitor`]: optional periodic progress logging for a consumer;
//! - [`sync_consumer`]: inline, pull-based twin used by the sync bus.

pub(crate) mod consumer;
pub(crate) mod monitor;

#[cfg(feature = "sync")]
pub(crate) mod sync_consumer;

pub(crate) use consumer::Consumer;

#[cfg(feature = "sync")]
pub(crate) use sync_consumer::SyncConsumer;
