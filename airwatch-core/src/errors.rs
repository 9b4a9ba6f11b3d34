//! Error Types for the Telemetry-to-Alert Pipeline
//!
//! ## Design Philosophy
//!
//! Airwatch runs two infinite control loops that must never die. The error
//! system reflects that:
//!
//! 1. **Per-Iteration Containment**: Every error maps to "abandon this
//!    iteration" at some layer - a bad frame discards one sample, a failed
//!    file write skips one append, a single unparsable CSV field skips one
//!    value. No variant is designed to escalate to process exit.
//!
//! 2. **Small and Copyable**: The `no_std`-capable errors (`FrameError`,
//!    `BusError`) carry only inline data and implement `Copy`, so they can
//!    be returned from hot paths without allocation.
//!
//! 3. **Actionable Context**: Each variant carries the numbers an operator
//!    needs (expected/actual lengths, device address) so a log line alone
//!    is enough to diagnose the fault.
//!
//! ## Error Categories
//!
//! - `BusError` - the transport failed to deliver a frame. The ingest loop
//!   logs it and sleeps until its next scheduled tick.
//! - `FrameError` - the transport delivered bytes that cannot be a frame.
//!   The sample is discarded.
//! - `StoreError` (std) - a store or alert-log operation failed. The
//!   enclosing loop iteration is abandoned; the files are reopened fresh on
//!   the next cycle, so a transient I/O fault self-heals.
//!
//! Field-level parse failures during read-back are deliberately *not* an
//! error type: the store skips the single value and keeps reading.

use thiserror_no_std::Error;

/// Errors produced while decoding a raw telemetry frame
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer shorter than the fixed frame length
    #[error("short frame: expected {expected} bytes, got {actual}")]
    ShortFrame {
        /// Fixed frame length the decoder requires
        expected: usize,
        /// Length of the buffer actually supplied
        actual: usize,
    },
}

/// Errors produced by the sensor bus transport
///
/// No retry lives at this layer; the ingest loop owns the retry policy
/// (which is simply "try again next tick").
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Transport-level failure (arbitration loss, I/O error, ...)
    #[error("bus transport failure: {reason}")]
    Transport {
        /// Short static description of what the transport reported
        reason: &'static str,
    },

    /// Device did not acknowledge its address
    #[error("no response from device at address {addr:#04x}")]
    NoAck {
        /// 7-bit device address that was queried
        addr: u8,
    },
}

/// Errors produced by the hour-rotated stores (std only)
#[cfg(feature = "std")]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying filesystem operation failed
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Directory contains no store file yet
    ///
    /// The watchdog treats this as "nothing to check", not a fault: the
    /// ingest process simply has not produced its first file.
    #[error("no store file found in {dir}")]
    NoStore {
        /// Directory that was scanned
        dir: String,
    },

    /// Timestamp cannot be represented as a local calendar time
    #[error("timestamp outside representable range")]
    TimeRange,
}
