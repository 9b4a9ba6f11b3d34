//! Core telemetry-to-alert pipeline for Airwatch
//!
//! Decodes binary telemetry frames from an indoor air-quality sensor node,
//! persists them as hour-rotated CSV logs, and evaluates rolling averages
//! against per-parameter thresholds with an exposure (debounce) policy.
//!
//! Key constraints:
//! - Decode/window/policy layers are `no_std` capable for small nodes
//! - No heap allocation in the evaluation path (`heapless` windows)
//! - Every failure is contained to a single loop iteration; nothing here
//!   is process-fatal
//!
//! ```no_run
//! use airwatch_core::frame::{self, FRAME_LEN};
//!
//! let raw = [0u8; FRAME_LEN];
//! // Decode one frame captured at t = 1000 ms
//! match frame::decode(&raw, 1000) {
//!     Ok(reading) => {}, // Persist, aggregate, evaluate
//!     Err(e) => {},      // Discard the sample, keep the loop alive
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alert;
pub mod bus;
pub mod errors;
pub mod exposure;
pub mod frame;
pub mod indicator;
pub mod policy;
pub mod time;
pub mod window;

#[cfg(feature = "std")]
pub mod store;

// Public API
pub use alert::{Alert, AlertEscalator};
pub use errors::{BusError, FrameError};
pub use exposure::ExposureTracker;
pub use frame::{Parameter, Reading, FRAME_LEN, PARAM_COUNT};
pub use policy::{Limit, ThresholdPolicy, ThresholdSpec};
pub use window::{Averages, RollingAggregator, Window};

#[cfg(feature = "std")]
pub use errors::StoreError;
#[cfg(feature = "std")]
pub use store::{AlertLog, ReadingStore};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
