//! Indicator implementations for the node
//!
//! On the reference hardware the indicator is an LED on a GPIO pin; that
//! electrical driver lives outside this repo. The node ships a console
//! implementation that keeps the *timing contract* - it blocks for the
//! full pulse sequence - so the watchdog's cadence behaves identically
//! with or without real hardware.

use std::thread;
use std::time::Duration;

use airwatch_core::indicator::Indicator;
use log::warn;

/// Indicator that logs each burst and sleeps out the pulse timing
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleIndicator;

impl Indicator for ConsoleIndicator {
    fn signal(&mut self, pulses: u8, on: Duration, off: Duration) {
        warn!("ALERT indicator: {} pulses", pulses);
        for _ in 0..pulses {
            thread::sleep(on);
            thread::sleep(off);
        }
    }
}
