//! Synthetic sensor bus
//!
//! Generates plausible, slowly drifting air-quality frames so the full
//! pipeline - ingest, store, watchdog, alerts - runs on a desk with no
//! sensor attached. The generator encodes real big-endian registers into
//! real 37-byte frames, so the ingest path exercises the actual decoder
//! rather than bypassing it.
//!
//! Values follow a slow sine drift around indoor baselines with a touch
//! of deterministic jitter. An optional forced offset pushes selected
//! channels over their limits, which is how the watchdog's alert path is
//! demonstrated end to end.

use airwatch_core::bus::SensorBus;
use airwatch_core::frame::{Parameter, FRAME_LEN, PARAM_COUNT};
use airwatch_core::BusError;

/// Baseline engineering values for a quiet indoor room
const BASELINE: [f32; PARAM_COUNT] = [
    45.0,  // NC_0.3
    30.0,  // NC_0.5
    12.0,  // NC_1.0
    4.0,   // NC_2.5
    1.0,   // NC_4.0
    5.0,   // PM1_KCl
    8.0,   // PM2.5_KCl
    12.0,  // PM10_KCl
    6.0,   // PM1_Smoke
    9.0,   // PM2.5_Smoke
    13.0,  // PM10_Smoke
    22.5,  // Temperature_C
    45.0,  // Humidity_pct
    0.4,   // TVOC_ppm
    650.0, // eCO2_ppm
    1.8,   // IAQ
    95.0,  // Relative_IAQ
];

/// Per-channel drift amplitude, roughly 10% of baseline
const AMPLITUDE: [f32; PARAM_COUNT] = [
    5.0, 3.0, 1.5, 0.5, 0.2, 0.8, 1.0, 1.5, 0.8, 1.0, 1.5, 1.5, 5.0, 0.1, 80.0, 0.4, 6.0,
];

/// Inverse of the decoder's scale factor, to go engineering -> register
const INV_SCALE: [f32; PARAM_COUNT] = [
    10.0, 10.0, 10.0, 10.0, 10.0, // NC × 0.1
    10.0, 10.0, 10.0, // PM KCl × 0.1
    10.0, 10.0, 10.0, // PM Smoke × 0.1
    100.0,  // Temperature × 0.01
    100.0,  // Humidity × 0.01
    200.0,  // TVOC × 0.005
    1.0,    // eCO2 × 1
    100.0,  // IAQ × 0.01
    1.0,    // Relative_IAQ × 1
];

/// Bus implementation that synthesizes frames
pub struct SyntheticBus {
    tick: u32,
    offsets: [f32; PARAM_COUNT],
}

impl SyntheticBus {
    /// New generator starting at its baselines
    pub fn new() -> Self {
        Self {
            tick: 0,
            offsets: [0.0; PARAM_COUNT],
        }
    }

    /// Force a constant offset onto one channel
    ///
    /// Useful to demonstrate alerts: offsetting `Temperature_C` by +15
    /// pushes the average past the default 35 °C limit within a window.
    pub fn with_offset(mut self, parameter: Parameter, offset: f32) -> Self {
        self.offsets[parameter.index()] = offset;
        self
    }

    /// Current engineering value for one channel at this tick
    fn value(&self, parameter: Parameter) -> f32 {
        let i = parameter.index();
        // Slow drift (~10 min period) plus small per-channel phase shift
        let phase = self.tick as f32 / 600.0 + i as f32 * 0.7;
        let drift = libm::sinf(phase) * AMPLITUDE[i];
        (BASELINE[i] + drift + self.offsets[i]).max(0.0)
    }
}

impl Default for SyntheticBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorBus for SyntheticBus {
    fn read_frame(&mut self, frame: &mut [u8; FRAME_LEN]) -> Result<(), BusError> {
        frame.fill(0);
        // Status word: all-clear
        frame[0] = 0;
        frame[1] = 0;

        for (i, parameter) in Parameter::ALL.iter().enumerate() {
            let register = (self.value(*parameter) * INV_SCALE[i]).round();
            let raw = if *parameter == Parameter::TemperatureC {
                (register as i16) as u16
            } else {
                register.clamp(0.0, u16::MAX as f32) as u16
            };
            let offset = 2 + i * 2;
            frame[offset..offset + 2].copy_from_slice(&raw.to_be_bytes());
        }

        // Integrity byte: cheap sum over the payload, stand-in for the
        // device's checksum (the decoder carries it, never verifies it)
        frame[FRAME_LEN - 1] = frame[..FRAME_LEN - 1]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_add(*b));

        self.tick += 1;
        Ok(())
    }
}
