//! Ingest loop: bus → decoder → reading store
//!
//! Runs at a fixed 1 Hz target cadence, drift-compensated: each iteration
//! measures how long its own work took and sleeps only the remainder of
//! the interval. A slow bus transaction therefore eats into the sleep,
//! not into the schedule.
//!
//! Containment rule: a bus failure, a short frame or a store write error
//! aborts *that iteration only*. The loop logs the fault and proceeds to
//! its next scheduled tick, forever.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror_no_std::Error;

use airwatch_core::bus::SensorBus;
use airwatch_core::time::TimeSource;
use airwatch_core::{frame, BusError, FrameError, ReadingStore, StoreError};

/// How often a routine "still alive" summary is logged
const SUMMARY_EVERY: u64 = 10;

/// Anything that can abort one ingest iteration
#[derive(Error, Debug)]
pub enum IngestError {
    /// Transport failed to deliver a frame
    #[error(transparent)]
    Bus(#[from] BusError),
    /// Delivered bytes were not a valid frame
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Reading store rejected the append
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One ingest iteration: read, decode, append
///
/// Factored out of the loop so tests can drive iterations directly
/// against a mock bus and a temp-directory store.
pub fn ingest_once<B: SensorBus>(
    bus: &mut B,
    store: &ReadingStore,
    clock: &impl TimeSource,
) -> Result<(), IngestError> {
    let mut buf = [0u8; frame::FRAME_LEN];
    bus.read_frame(&mut buf)?;

    let reading = frame::decode(&buf, clock.now())?;
    store.append(&reading)?;
    Ok(())
}

/// Run the ingest loop until the process is terminated
pub fn run<B: SensorBus>(
    bus: &mut B,
    store: &ReadingStore,
    clock: &impl TimeSource,
    interval: Duration,
) -> ! {
    let mut iterations: u64 = 0;
    loop {
        let started = Instant::now();

        match ingest_once(bus, store, clock) {
            Ok(()) => {
                iterations += 1;
                if iterations % SUMMARY_EVERY == 0 {
                    debug!("ingested {} samples", iterations);
                }
            }
            Err(error) => warn!("ingest iteration skipped: {}", error),
        }

        // Drift compensation: sleep only what is left of the interval
        let elapsed = started.elapsed();
        if let Some(remaining) = interval.checked_sub(elapsed) {
            thread::sleep(remaining);
        }
    }
}
