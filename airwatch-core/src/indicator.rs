//! Indicator capability: the physical "something is wrong" output
//!
//! The watchdog owns no GPIO code; it only needs an abstract blocking
//! pulse capability. Implementations live with the platform (the node
//! crate ships a logging one, firmware would wrap a real pin driver).
//!
//! `signal` is *blocking by contract*: it returns only after the full
//! pulse sequence completes, and the watchdog deliberately absorbs that
//! delay before its next tick. An implementation may offload the actual
//! timing elsewhere as long as it still blocks for an equivalent duration,
//! so the check cadence semantics stay unchanged.

use core::time::Duration;

/// Pulses emitted per alerting check cycle
pub const ALERT_PULSES: u8 = 3;

/// On-time of each pulse
pub const PULSE_ON: Duration = Duration::from_millis(200);

/// Off-time between pulses
pub const PULSE_OFF: Duration = Duration::from_millis(200);

/// Abstract blocking visual/audible output
pub trait Indicator {
    /// Toggle the output `pulses` times with the given on/off timing,
    /// returning only after the sequence completes
    fn signal(&mut self, pulses: u8, on: Duration, off: Duration);
}

/// Indicator that does nothing, for deployments without hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn signal(&mut self, _pulses: u8, _on: Duration, _off: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_indicator_accepts_any_sequence() {
        let mut indicator = NullIndicator;
        indicator.signal(ALERT_PULSES, PULSE_ON, PULSE_OFF);
        indicator.signal(0, Duration::ZERO, Duration::ZERO);
    }
}
