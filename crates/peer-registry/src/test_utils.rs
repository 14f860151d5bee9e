//! Test utilities for the peer registry.
//!
//! Deterministic `TimeSource` implementations. Enable with the `test-utils`
//! feature flag.
//!
//! # Example
//!
//! ```rust
//! use peer_registry::test_utils::ManualTimeSource;
//! use peer_registry::TimeSource;
//!
//! let clock = ManualTimeSource::new(1000);
//! clock.advance(30);
//! assert_eq!(clock.now().as_secs(), 1030);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::Timestamp;
use crate::ports::TimeSource;

/// A time source that returns a fixed timestamp.
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: u64,
}

impl FixedTimeSource {
    /// Create a new fixed time source with the given timestamp (in seconds).
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }

    /// Get the configured timestamp value.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.timestamp)
    }
}

/// A time source the test moves forward by hand.
///
/// Clones share the same clock, so a test can keep one handle and give the
/// other to the registry.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    secs: Arc<AtomicU64>,
}

impl ManualTimeSource {
    /// Start the clock at `timestamp` seconds.
    pub fn new(timestamp: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(timestamp)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set(&self, timestamp: u64) {
        self.secs.store(timestamp, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.secs.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time_source_returns_configured_value() {
        let source = FixedTimeSource::new(1000);
        assert_eq!(source.now().as_secs(), 1000);
        assert_eq!(source.timestamp(), 1000);
    }

    #[test]
    fn test_manual_time_source_clones_share_clock() {
        let clock = ManualTimeSource::new(10);
        let handle = clock.clone();

        handle.advance(5);
        assert_eq!(clock.now().as_secs(), 15);

        handle.set(100);
        assert_eq!(clock.now().as_secs(), 100);
    }
}
