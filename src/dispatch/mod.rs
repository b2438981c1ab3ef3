//! Event dispatchers: fan one event out to a subscriber snapshot.
//!
//! The dispatcher is a stateless delivery primitive and a seam: the bus
//! builder takes a [`DispatcherFactory`] and invokes it once per consumer,
//! so delivery can be customized (tracing wrappers, test doubles) without
//! touching the consumer loop.
//!
//! ## Contents
//! - [`Dispatch`] trait: deliver one envelope to all subscribers, await all
//!   completions, absorb individual handler failures
//! - [`FanOutDispatcher`] default concurrent implementation
//! - [`DispatcherFactory`] boxed constructor used by the bus

mod fanout;

pub use fanout::{Dispatch, FanOutDispatcher};

/// Constructor invoked once per consumer to build its dispatcher.
pub type DispatcherFactory = Box<dyn Fn() -> Box<dyn Dispatch> + Send + Sync>;

#[cfg(feature = "sync")]
pub use fanout::{DispatchSync, SyncFanOutDispatcher};

/// Constructor invoked once per sync consumer to build its dispatcher.
#[cfg(feature = "sync")]
pub type SyncDispatcherFactory = Box<dyn Fn() -> Box<dyn DispatchSync> + Send + Sync>;
