//! # Event trait and type-erased envelope.
//!
//! Published values are routed by their Rust type: one consumer per
//! [`TypeId`]. Inside the bus an event travels as an [`EventEnvelope`], an
//! immutable `Arc`-backed payload tagged with the type identity it was
//! published under plus sequencing metadata.
//!
//! ## Ordering guarantees
//! Each envelope carries a globally unique sequence number (`seq`) assigned
//! at publish time, increasing monotonically across all event types. Within
//! one type, queue order equals `seq` order.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for envelope ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Marker trait for values that can be published on the bus.
///
/// The bus routes by the implementing type's [`TypeId`]; no further contract
/// is imposed. Events should be treated as immutable once published: the
/// same envelope is shared by every subscriber of the type.
///
/// # Example
/// ```
/// use typebus::Event;
///
/// struct OrderPlaced {
///     pub order_id: u64,
/// }
///
/// impl Event for OrderPlaced {}
/// ```
pub trait Event: Any + Send + Sync + 'static {}

/// Immutable, type-erased carrier for one published event.
///
/// Cheap to clone (payload is behind an `Arc`). The envelope remembers the
/// concrete type it was created from, so consumers can verify that a queue
/// hands back events of the type they own, and typed subscribers can
/// downcast without guessing.
#[derive(Clone)]
pub struct EventEnvelope {
    payload: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
    seq: u64,
    at: SystemTime,
}

impl EventEnvelope {
    /// Wraps a typed event, assigning the next global sequence number and a
    /// wall-clock timestamp.
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            payload: Arc::new(event),
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
        }
    }

    /// Type identity this envelope was published under.
    #[inline]
    pub fn event_type(&self) -> TypeId {
        self.type_id
    }

    /// Name of the concrete event type (diagnostics only; not stable).
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Globally unique, monotonically increasing sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wall-clock timestamp taken at publish time.
    #[inline]
    pub fn at(&self) -> SystemTime {
        self.at
    }

    /// Borrows the payload as the concrete event type.
    ///
    /// Returns `None` when `E` is not the type the envelope was published
    /// under.
    #[inline]
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("type_name", &self.type_name)
            .field("seq", &self.seq)
            .field("at", &self.at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping(u32);
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    #[test]
    fn test_downcast_to_published_type() {
        let env = EventEnvelope::new(Ping(7));
        assert_eq!(env.event_type(), TypeId::of::<Ping>());
        assert_eq!(env.downcast_ref::<Ping>().map(|p| p.0), Some(7));
        assert!(env.downcast_ref::<Pong>().is_none());
    }

    #[test]
    fn test_seq_is_monotonic() {
        let a = EventEnvelope::new(Ping(1));
        let b = EventEnvelope::new(Pong);
        let c = EventEnvelope::new(Ping(2));
        assert!(a.seq() < b.seq());
        assert!(b.seq() < c.seq());
    }

    #[test]
    fn test_clone_shares_payload() {
        let env = EventEnvelope::new(Ping(3));
        let copy = env.clone();
        assert_eq!(env.seq(), copy.seq());
        assert_eq!(copy.downcast_ref::<Ping>().map(|p| p.0), Some(3));
    }
}
