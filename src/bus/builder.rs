//! # Bus builder: fail-fast construction.
//!
//! The core never constructs its own collaborators: a bus is assembled from
//! a queue factory, a dispatcher factory, and a configuration, and
//! [`AsyncEventBusBuilder::build`] reports a construction error when any of
//! the three is absent.
//!
//! [`AsyncEventBusBuilder::with_defaults`] pre-fills the stock
//! collaborators ([`FifoEventQueue`], [`FanOutDispatcher`],
//! `BusConfig::default()`) for callers that only want to override some of
//! them.

use crate::bus::AsyncEventBus;
use crate::config::BusConfig;
use crate::dispatch::{Dispatch, DispatcherFactory, FanOutDispatcher};
use crate::error::BusError;
use crate::queue::{EventQueue, FifoEventQueue, QueueFactory};

/// Builder for [`AsyncEventBus`].
///
/// # Example
/// ```
/// use typebus::{AsyncEventBusBuilder, BusConfig};
///
/// # fn main() -> Result<(), typebus::BusError> {
/// let mut config = BusConfig::default();
/// config.max_concurrency = 2;
///
/// let bus = AsyncEventBusBuilder::with_defaults()
///     .with_config(config)
///     .build()?;
/// # drop(bus);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct AsyncEventBusBuilder {
    queue_factory: Option<QueueFactory>,
    dispatcher_factory: Option<DispatcherFactory>,
    config: Option<BusConfig>,
}

impl AsyncEventBusBuilder {
    /// Creates an empty builder; every collaborator must be supplied before
    /// `build`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled with the default collaborators.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_queue_factory(|| Box::new(FifoEventQueue::new()))
            .with_dispatcher_factory(|| Box::new(FanOutDispatcher::new()))
            .with_config(BusConfig::default())
    }

    /// Sets the factory invoked once per consumer to build its queue.
    #[must_use]
    pub fn with_queue_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn EventQueue> + Send + Sync + 'static,
    {
        self.queue_factory = Some(Box::new(factory));
        self
    }

    /// Sets the factory invoked once per consumer to build its dispatcher.
    #[must_use]
    pub fn with_dispatcher_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Dispatch> + Send + Sync + 'static,
    {
        self.dispatcher_factory = Some(Box::new(factory));
        self
    }

    /// Sets the bus configuration.
    #[must_use]
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the bus.
    ///
    /// Fails fast with [`BusError::MissingQueueFactory`],
    /// [`BusError::MissingDispatcherFactory`], or
    /// [`BusError::MissingConfiguration`] when a collaborator was not
    /// supplied.
    pub fn build(self) -> Result<AsyncEventBus, BusError> {
        let queue_factory = self.queue_factory.ok_or(BusError::MissingQueueFactory)?;
        let dispatcher_factory = self
            .dispatcher_factory
            .ok_or(BusError::MissingDispatcherFactory)?;
        let config = self.config.ok_or(BusError::MissingConfiguration)?;

        Ok(AsyncEventBus::new(queue_factory, dispatcher_factory, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_queue_factory() {
        let err = AsyncEventBusBuilder::new()
            .with_dispatcher_factory(|| Box::new(FanOutDispatcher::new()))
            .with_config(BusConfig::default())
            .build()
            .map(drop)
            .unwrap_err();
        assert!(matches!(err, BusError::MissingQueueFactory));
    }

    #[test]
    fn test_build_requires_dispatcher_factory() {
        let err = AsyncEventBusBuilder::new()
            .with_queue_factory(|| Box::new(FifoEventQueue::new()))
            .with_config(BusConfig::default())
            .build()
            .map(drop)
            .unwrap_err();
        assert!(matches!(err, BusError::MissingDispatcherFactory));
    }

    #[test]
    fn test_build_requires_configuration() {
        let err = AsyncEventBusBuilder::new()
            .with_queue_factory(|| Box::new(FifoEventQueue::new()))
            .with_dispatcher_factory(|| Box::new(FanOutDispatcher::new()))
            .build()
            .map(drop)
            .unwrap_err();
        assert!(matches!(err, BusError::MissingConfiguration));
    }

    #[test]
    fn test_with_defaults_builds() {
        assert!(AsyncEventBusBuilder::with_defaults().build().is_ok());
    }
}
