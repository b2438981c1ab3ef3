//! # Core subscriber traits.
//!
//! [`Subscribe`] is the extension point for plugging handlers into the bus.
//! A subscriber registers for exactly one event type and receives every
//! event of that type dispatched after its registration completes.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries) – a slow handler
//!   delays completion of its own dispatch, never sibling subscribers of the
//!   same event (they run concurrently) and never the publisher.
//! - A returned [`HandlerError`] is absorbed at the dispatch layer: it is
//!   logged with the subscriber's name and does not affect other
//!   subscribers or later events.

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// Contract for asynchronous event subscribers.
///
/// Called from the owning consumer's dispatch tasks. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use typebus::{Event, HandlerError, Subscribe};
///
/// struct OrderPlaced {
///     pub order_id: u64,
/// }
/// impl Event for OrderPlaced {}
///
/// struct Audit;
///
/// #[async_trait]
/// impl Subscribe<OrderPlaced> for Audit {
///     async fn on_event(&self, event: &OrderPlaced) -> Result<(), HandlerError> {
///         // write audit record...
///         let _ = event.order_id;
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "audit"
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe<E: Event>: Send + Sync + 'static {
    /// Handles a single event of type `E`.
    async fn on_event(&self, event: &E) -> Result<(), HandlerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Contract for synchronous event subscribers (pull-based bus variant).
///
/// Called inline from [`SyncEventBus::consume_events`]; there is no worker
/// or queue between the caller and the handler.
///
/// [`SyncEventBus::consume_events`]: crate::SyncEventBus::consume_events
#[cfg(feature = "sync")]
pub trait SubscribeSync<E: Event>: Send + Sync + 'static {
    /// Handles a single event of type `E`.
    fn on_event(&self, event: &E) -> Result<(), HandlerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
