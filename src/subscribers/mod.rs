//! Subscribers: typed handler traits, type erasure, and the copy-on-write set.
//!
//! ## Architecture
//! ```text
//! user type S: Subscribe<E>                 (typed, what users implement)
//!        │
//!        ▼  TypedSubscriber<E> adapter      (downcasts EventEnvelope → &E)
//! Arc<dyn EventSubscriber>                  (erased, what consumers store)
//!        │
//!        ▼
//! SubscriberSet ── snapshot() ──► dispatcher fan-out
//! ```
//!
//! ## Contents
//! - [`Subscribe`] typed async handler trait (the extension point)
//! - [`EventSubscriber`] object-safe erased trait consumed by dispatchers
//! - [`TypedSubscriber`] adapter between the two
//! - [`SubscriberSet`] copy-on-write snapshot store read lock-free by
//!   in-flight dispatches

mod erased;
mod set;
mod subscribe;

pub use erased::{EventSubscriber, TypedSubscriber};
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "sync")]
pub use erased::{SyncEventSubscriber, SyncTypedSubscriber};
#[cfg(feature = "sync")]
pub use subscribe::SubscribeSync;
