//! Bus front-ends: registry, routing, lifecycle.
//!
//! The bus maps event types to consumers, creating each consumer lazily on
//! first subscription, and owns global shutdown.
//!
//! ## Contents
//! - [`AsyncEventBus`] push-based bus with one dispatch loop per event type
//! - [`AsyncEventBusBuilder`] fail-fast construction from the three required
//!   collaborators (queue factory, dispatcher factory, configuration)
//! - [`SyncEventBus`] / [`SyncEventBusBuilder`] single-threaded, pull-based
//!   variant (`sync` feature)

mod async_bus;
mod builder;

#[cfg(feature = "sync")]
mod sync_bus;

pub use async_bus::AsyncEventBus;
pub use builder::AsyncEventBusBuilder;

#[cfg(feature = "sync")]
pub use sync_bus::{SyncEventBus, SyncEventBusBuilder};
