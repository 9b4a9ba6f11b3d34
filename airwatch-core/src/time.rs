//! Time management for the sensor node
//!
//! Provides a clock abstraction so the pipeline can run against:
//! - The system clock (normal operation)
//! - A fixed, manually advanced clock (tests, especially hour rotation)
//!
//! Store rotation is driven by the timestamp *carried on each record*, not
//! by ambient calls to "now", which is what makes the rotation logic
//! testable with a simulated clock.

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Milliseconds in one hour, the rotation granularity of the stores
pub const MILLIS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Source of time for the control loops
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs simulated)
    fn is_wall_clock(&self) -> bool;
}

/// System wall clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
///
/// Advanced explicitly by the test; never moves on its own.
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a clock frozen at the given timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
