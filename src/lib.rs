//! # typebus
//!
//! **typebus** is an in-process, typed publish/subscribe event bus for Rust.
//!
//! Producers publish plain values; every subscriber registered for that
//! value's type receives it. Routing is by Rust type identity: each event
//! type gets its own consumer with a FIFO queue and a bounded-concurrency
//! dispatch loop, so slow handlers for one type never delay another type.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  publisher A      publisher B      publisher C
//!      │                │                │
//!      └── publish(E1)  ├── publish(E1)  └── publish(E2)
//!                 ▼     ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  AsyncEventBus                                                │
//! │  - registry: event type → Consumer (lazy, created once)       │
//! │  - shared CancellationToken (graceful shutdown)               │
//! └──────────────┬───────────────────────────────┬────────────────┘
//!                ▼                               ▼
//!     ┌────────────────────┐          ┌────────────────────┐
//!     │  Consumer for E1   │          │  Consumer for E2   │
//!     │  queue (FIFO)      │          │  queue (FIFO)      │
//!     │  wake (counting)   │          │  wake (counting)   │
//!     │  limiter (≤ N)     │          │  limiter (≤ N)     │
//!     └─────────┬──────────┘          └─────────┬──────────┘
//!               ▼ dispatch (event, snapshot)    ▼
//!     ┌─────────┼─────────┐                     │
//!     ▼         ▼         ▼                     ▼
//!   sub1      sub2      sub3                  sub4
//!   .on_event()  (concurrent fan-out, all awaited)
//! ```
//!
//! ### Lifecycle
//! ```text
//! add_subscriber::<E>() ──► get-or-create Consumer ──► spawn run(token)
//!
//! Consumer::run loop {
//!   ├─► wait for wake permit (one per enqueue; never misses work)
//!   ├─► drain queue in FIFO order:
//!   │     ├─► acquire concurrency slot (≤ N dispatches in flight)
//!   │     └─► spawn dispatch(event, subscriber snapshot)
//!   └─► on shutdown: stop admitting, await in-flight, exit
//! }
//!
//! shutdown() ──► cancel shared token ──► await every consumer loop
//! ```
//!
//! ## Guarantees
//! | Property          | Description                                                       |
//! |-------------------|-------------------------------------------------------------------|
//! | **Per-type FIFO** | Events of one type start dispatch in publish order.               |
//! | **Bounded fan-out** | At most `max_concurrency` dispatches in flight per consumer.    |
//! | **Isolation**     | A failing or panicking handler never affects siblings or later events. |
//! | **Non-blocking publish** | `publish` never blocks and never errors; unregistered types are dropped. |
//! | **Graceful shutdown** | In-flight dispatches complete before `shutdown` returns.      |
//!
//! ## Optional features
//! - `sync`: exports `SyncEventBus`, a single-threaded pull-based variant
//!   (`publish` then `consume_events`; no runtime required).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use typebus::{AsyncEventBusBuilder, Event, HandlerError, Subscribe};
//!
//! struct OrderPlaced {
//!     order_id: u64,
//! }
//! impl Event for OrderPlaced {}
//!
//! struct OrderAudit;
//!
//! #[async_trait]
//! impl Subscribe<OrderPlaced> for OrderAudit {
//!     async fn on_event(&self, event: &OrderPlaced) -> Result<(), HandlerError> {
//!         println!("order placed: {}", event.order_id);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), typebus::BusError> {
//!     let bus = AsyncEventBusBuilder::with_defaults().build()?;
//!
//!     bus.add_subscriber::<OrderPlaced>(Arc::new(OrderAudit));
//!     bus.publish(OrderPlaced { order_id: 42 });
//!
//!     bus.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod bus;
mod config;
mod core;
mod dispatch;
mod error;
mod events;
mod queue;
mod subscribers;

// ---- Public re-exports ----

pub use bus::{AsyncEventBus, AsyncEventBusBuilder};
pub use config::BusConfig;
pub use dispatch::{Dispatch, DispatcherFactory, FanOutDispatcher};
pub use error::{BusError, HandlerError};
pub use events::{Event, EventEnvelope};
pub use queue::{EventQueue, FifoEventQueue, QueueFactory};
pub use subscribers::{EventSubscriber, Subscribe, SubscriberSet, TypedSubscriber};

// Optional: single-threaded, pull-based bus variant.
// Enable with: `--features sync`
#[cfg(feature = "sync")]
pub use bus::{SyncEventBus, SyncEventBusBuilder};
#[cfg(feature = "sync")]
pub use dispatch::{DispatchSync, SyncDispatcherFactory, SyncFanOutDispatcher};
#[cfg(feature = "sync")]
pub use subscribers::{SubscribeSync, SyncEventSubscriber, SyncTypedSubscriber};
