//! # Bus configuration.
//!
//! Provides [`BusConfig`], the settings consumed by every consumer the bus
//! creates.
//!
//! Config is used in two ways:
//! 1. **Bus construction**: `AsyncEventBusBuilder::with_config(config)`
//! 2. **Consumer creation**: each lazily created consumer copies the limits
//!    it needs (`max_concurrency`, `debug_logging`, `monitor_interval`)
//!
//! ## Sentinel values
//! - `max_concurrency = 0` → clamped to 1 by [`BusConfig::max_concurrency_clamped`]

use std::time::Duration;

/// Configuration for the event bus and its consumers.
///
/// ## Field semantics
/// - `max_concurrency`: per-consumer dispatch concurrency limit (min 1; clamped)
/// - `debug_logging`: enables the periodic per-consumer progress monitor and
///   extra `tracing` debug lines; purely observational, no behavioral effect
/// - `monitor_interval`: cadence of the progress monitor when enabled
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum number of dispatch operations in flight per consumer.
    ///
    /// Each dispatch fans out to every subscriber of its event type, so the
    /// number of running handlers can exceed this transiently, but never the
    /// number of events being dispatched.
    pub max_concurrency: usize,

    /// Emit structured progress lines (queue depth, in-flight count,
    /// throughput) for every consumer at `monitor_interval`.
    pub debug_logging: bool,

    /// Interval between progress lines when `debug_logging` is enabled.
    pub monitor_interval: Duration,
}

impl BusConfig {
    /// Returns the dispatch concurrency limit clamped to a minimum of 1.
    ///
    /// Consumers use this value so a zero in the config cannot produce a
    /// limiter that never admits work.
    #[inline]
    pub fn max_concurrency_clamped(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `max_concurrency = 4`
    /// - `debug_logging = false`
    /// - `monitor_interval = 1s`
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            debug_logging: false,
            monitor_interval: Duration::from_secs(1),
        }
    }
}
