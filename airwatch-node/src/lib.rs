//! Airwatch node runtime
//!
//! Hosts the two independent control loops around `airwatch-core`:
//!
//! - **Ingest** (`airwatch-ingest`): once per second, read one frame from
//!   the bus, decode it, append it to the reading store.
//! - **Watchdog** (`airwatch-watchdog`): every ten seconds, re-read the
//!   recent rows, refill the rolling windows, evaluate thresholds, log
//!   alerts and pulse the indicator.
//!
//! The loops are separate processes that share nothing but the store
//! directory on disk. Either can be restarted without touching the other.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod indicator;
pub mod ingest;
pub mod synth;
pub mod watchdog;

pub use config::NodeConfig;
