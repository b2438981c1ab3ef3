//! Error types used by the event bus and subscriber handlers.
//!
//! This module defines two main error enums:
//!
//! - [`BusError`] — errors raised by the bus itself: missing construction
//!   collaborators and fatal queue-contract violations.
//! - [`HandlerError`] — errors raised by individual subscriber handlers
//!   during dispatch.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. Handler errors never cross the consumer boundary; they
//! are absorbed and logged at the dispatch layer.

use thiserror::Error;

/// # Errors produced by the event bus.
///
/// Construction errors are raised immediately when a required collaborator
/// (queue factory, dispatcher factory, configuration) is absent at build
/// time. A queue-contract violation is a fatal internal failure of a
/// consumer's run loop and surfaces from [`AsyncEventBus::shutdown`].
///
/// [`AsyncEventBus::shutdown`]: crate::AsyncEventBus::shutdown
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The builder was not given a queue factory.
    #[error("event bus construction requires a queue factory")]
    MissingQueueFactory,

    /// The builder was not given a dispatcher factory.
    #[error("event bus construction requires a dispatcher factory")]
    MissingDispatcherFactory,

    /// The builder was not given a configuration.
    #[error("event bus construction requires a configuration")]
    MissingConfiguration,

    /// The queue yielded an event of the wrong type.
    ///
    /// A consumer owns events of exactly one type; a mismatched envelope
    /// means the queue implementation is internally inconsistent. This is
    /// unrecoverable and terminates the consumer's run loop.
    #[error("queue yielded event of type {found}, consumer owns {expected}: queue implementation is corrupt")]
    QueueContract {
        /// Event type the consumer was created for.
        expected: &'static str,
        /// Event type actually dequeued.
        found: &'static str,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::BusError;
    ///
    /// assert_eq!(BusError::MissingQueueFactory.as_label(), "missing_queue_factory");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::MissingQueueFactory => "missing_queue_factory",
            BusError::MissingDispatcherFactory => "missing_dispatcher_factory",
            BusError::MissingConfiguration => "missing_configuration",
            BusError::QueueContract { .. } => "queue_contract_violation",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::MissingQueueFactory => "queue factory not provided".to_string(),
            BusError::MissingDispatcherFactory => "dispatcher factory not provided".to_string(),
            BusError::MissingConfiguration => "configuration not provided".to_string(),
            BusError::QueueContract { expected, found } => {
                format!("queue contract violated: expected={expected} found={found}")
            }
        }
    }
}

/// # Errors produced by subscriber handlers.
///
/// Raised by a subscriber while handling one event. The dispatcher absorbs
/// these locally: siblings of the failing subscriber still run, later events
/// are unaffected, and publishers never observe them.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler returned an error for this event.
    #[error("handler failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked while processing this event (caught by the dispatcher).
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    ///
    /// # Example
    /// ```
    /// use typebus::HandlerError;
    ///
    /// let err = HandlerError::fail("downstream unavailable");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_labels() {
        assert_eq!(
            BusError::MissingDispatcherFactory.as_label(),
            "missing_dispatcher_factory"
        );
        let err = BusError::QueueContract {
            expected: "a::B",
            found: "c::D",
        };
        assert_eq!(err.as_label(), "queue_contract_violation");
        assert!(err.as_message().contains("a::B"));
        assert!(err.as_message().contains("c::D"));
    }

    #[test]
    fn test_handler_error_fail_shorthand() {
        let err = HandlerError::fail("boom");
        assert_eq!(err.as_message(), "error: boom");
        assert_eq!(err.to_string(), "handler failed: boom");
    }
}
