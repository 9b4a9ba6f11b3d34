//! Exposure Tracking: Consecutive-Violation Counters
//!
//! ## Overview
//!
//! Debouncing needs memory: "violated for N consecutive checks" is a tiny
//! state machine per parameter. Each parameter is either `Normal`
//! (counter = 0) or `Violating(n)` (counter = n ≥ 1), and the transition
//! rule is evaluated exactly once per check cycle:
//!
//! ```text
//!               violated                    violated
//!             ┌──────────┐               ┌──────────┐
//!             ▼          │               ▼          │
//!   Normal(0) ──────► Violating(1) ──► Violating(2) ──► ...
//!       ▲                 │                 │
//!       └─────────────────┴─────────────────┘
//!                    not violated (reset)
//! ```
//!
//! The counter increments without bound while a violation persists and
//! snaps back to zero on the first acceptable cycle. Whether a given
//! counter value *fires* an alert is the policy's decision, not this
//! module's; the tracker only counts.
//!
//! ## Ownership
//!
//! The counters are explicit keyed state owned by whoever drives the
//! evaluation (the [`crate::alert::AlertEscalator`]), not ambient module
//! state. That makes the initial condition (all zero) and the reset rule
//! directly testable, and means the documented restart behavior - the
//! counters are process-memory only and reset when the watchdog restarts -
//! falls out of construction.

use crate::frame::{Parameter, PARAM_COUNT};

/// Per-parameter consecutive-violation counters
#[derive(Debug, Clone, Default)]
pub struct ExposureTracker {
    counters: [u32; PARAM_COUNT],
}

impl ExposureTracker {
    /// All counters at zero (the `Normal` state everywhere)
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one cycle's observation and return the updated counter
    ///
    /// Violating increments; acceptable resets to zero. The returned value
    /// is the *post-update* counter, which is what the firing rule is
    /// defined against.
    pub fn observe(&mut self, parameter: Parameter, violated: bool) -> u32 {
        let counter = &mut self.counters[parameter.index()];
        *counter = if violated { *counter + 1 } else { 0 };
        *counter
    }

    /// Current counter without updating it
    pub fn count(&self, parameter: Parameter) -> u32 {
        self.counters[parameter.index()]
    }

    /// Reset every counter to zero
    pub fn reset(&mut self) {
        self.counters = [0; PARAM_COUNT];
    }
}
