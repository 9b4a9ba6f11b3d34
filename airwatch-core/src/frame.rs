//! Binary Frame Decoding for the Air-Quality Sensor
//!
//! ## Overview
//!
//! The sensor answers every bus read with one fixed-length 37-byte frame
//! containing a complete sample: a status word, seventeen measurement
//! channels as big-endian 16-bit registers, and a trailing integrity byte.
//! This module turns that buffer into a typed [`Reading`].
//!
//! ## Frame Layout
//!
//! ```text
//! offset  size  field            conversion
//! ──────  ────  ───────────────  ─────────────────────────
//!  0      2     status           u16 bitfield, as-is
//!  2      10    NC_0.3 … NC_4.0  u16 × 0.1   (1/cm³)
//! 12      6     PM1…PM10 KCl     u16 × 0.1   (µg/m³)
//! 18      6     PM1…PM10 Smoke   u16 × 0.1   (µg/m³)
//! 24      2     Temperature_C    i16 × 0.01  (signed!)
//! 26      2     Humidity_pct     u16 × 0.01
//! 28      2     TVOC_ppm         u16 × 0.005 (composite scale)
//! 30      2     eCO2_ppm         u16 × 1
//! 32      2     IAQ              u16 × 0.01
//! 34      2     Relative_IAQ     u16 × 1
//! 36      1     integrity byte   u8, carried through
//! ```
//!
//! ## Design Notes
//!
//! - Temperature is the only signed register; everything else is unsigned.
//! - The TVOC scale 0.005 is the device's composite factor
//!   (10 × 0.001 × 0.5) folded into one constant.
//! - The integrity byte is extracted and carried on the [`Reading`] as a
//!   diagnostic field. It is *not* recomputed against the frame contents,
//!   so a corrupted-but-full-length frame still decodes. Known gap.
//! - Every numeric output is rounded to 4 decimal places here, exactly
//!   once. Downstream code (windows, alerts, CSV rows) never re-rounds.

use crate::errors::FrameError;
use crate::time::Timestamp;

/// Fixed length of one raw telemetry frame in bytes
pub const FRAME_LEN: usize = 37;

/// 7-bit bus address of the sensor
pub const SENSOR_ADDR: u8 = 0x69;

/// Number of measurement channels carried by each frame
pub const PARAM_COUNT: usize = 17;

/// Decimal places kept on every decoded value
const DECIMALS: f32 = 10_000.0;

/// Measured parameter, one per frame channel, in frame order
///
/// The discriminant doubles as the index into the dense value arrays used
/// by [`Reading`] and the aggregation windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Parameter {
    /// Particle count ≥ 0.3 µm
    Nc0p3 = 0,
    /// Particle count ≥ 0.5 µm
    Nc0p5 = 1,
    /// Particle count ≥ 1.0 µm
    Nc1p0 = 2,
    /// Particle count ≥ 2.5 µm
    Nc2p5 = 3,
    /// Particle count ≥ 4.0 µm
    Nc4p0 = 4,
    /// PM1 mass, KCl particle reference
    Pm1Kcl = 5,
    /// PM2.5 mass, KCl particle reference
    Pm2p5Kcl = 6,
    /// PM10 mass, KCl particle reference
    Pm10Kcl = 7,
    /// PM1 mass, smoke particle reference
    Pm1Smoke = 8,
    /// PM2.5 mass, smoke particle reference
    Pm2p5Smoke = 9,
    /// PM10 mass, smoke particle reference
    Pm10Smoke = 10,
    /// Air temperature
    TemperatureC = 11,
    /// Relative humidity
    HumidityPct = 12,
    /// Total volatile organic compounds
    TvocPpm = 13,
    /// Estimated CO2 concentration
    Eco2Ppm = 14,
    /// Indoor air quality index
    Iaq = 15,
    /// Relative indoor air quality index
    RelativeIaq = 16,
}

impl Parameter {
    /// All parameters in frame (and CSV column) order
    pub const ALL: [Parameter; PARAM_COUNT] = [
        Parameter::Nc0p3,
        Parameter::Nc0p5,
        Parameter::Nc1p0,
        Parameter::Nc2p5,
        Parameter::Nc4p0,
        Parameter::Pm1Kcl,
        Parameter::Pm2p5Kcl,
        Parameter::Pm10Kcl,
        Parameter::Pm1Smoke,
        Parameter::Pm2p5Smoke,
        Parameter::Pm10Smoke,
        Parameter::TemperatureC,
        Parameter::HumidityPct,
        Parameter::TvocPpm,
        Parameter::Eco2Ppm,
        Parameter::Iaq,
        Parameter::RelativeIaq,
    ];

    /// Canonical name, used as the CSV column header and config key
    pub const fn name(&self) -> &'static str {
        match self {
            Parameter::Nc0p3 => "NC_0.3",
            Parameter::Nc0p5 => "NC_0.5",
            Parameter::Nc1p0 => "NC_1.0",
            Parameter::Nc2p5 => "NC_2.5",
            Parameter::Nc4p0 => "NC_4.0",
            Parameter::Pm1Kcl => "PM1_KCl",
            Parameter::Pm2p5Kcl => "PM2.5_KCl",
            Parameter::Pm10Kcl => "PM10_KCl",
            Parameter::Pm1Smoke => "PM1_Smoke",
            Parameter::Pm2p5Smoke => "PM2.5_Smoke",
            Parameter::Pm10Smoke => "PM10_Smoke",
            Parameter::TemperatureC => "Temperature_C",
            Parameter::HumidityPct => "Humidity_pct",
            Parameter::TvocPpm => "TVOC_ppm",
            Parameter::Eco2Ppm => "eCO2_ppm",
            Parameter::Iaq => "IAQ",
            Parameter::RelativeIaq => "Relative_IAQ",
        }
    }

    /// Unit of measurement
    pub const fn unit(&self) -> &'static str {
        match self {
            Parameter::Nc0p3
            | Parameter::Nc0p5
            | Parameter::Nc1p0
            | Parameter::Nc2p5
            | Parameter::Nc4p0 => "1/cm³",
            Parameter::Pm1Kcl
            | Parameter::Pm2p5Kcl
            | Parameter::Pm10Kcl
            | Parameter::Pm1Smoke
            | Parameter::Pm2p5Smoke
            | Parameter::Pm10Smoke => "µg/m³",
            Parameter::TemperatureC => "°C",
            Parameter::HumidityPct => "%",
            Parameter::TvocPpm | Parameter::Eco2Ppm => "ppm",
            Parameter::Iaq | Parameter::RelativeIaq => "",
        }
    }

    /// Dense array index for this parameter
    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a parameter by its canonical name
    ///
    /// Used when mapping CSV header columns and config keys back to
    /// parameters; unknown names yield `None` rather than an error so the
    /// caller decides whether that is tolerable (store read-back) or fatal
    /// (config load).
    pub fn from_name(name: &str) -> Option<Parameter> {
        Parameter::ALL.iter().copied().find(|p| p.name() == name)
    }
}

/// How one 16-bit register converts to an engineering value
#[derive(Clone, Copy)]
enum Scale {
    /// Unsigned register times a fixed multiplier
    Unsigned(f32),
    /// Signed (two's complement) register times a fixed multiplier
    Signed(f32),
}

/// Register layout: byte offset and conversion per parameter, frame order
const LAYOUT: [(usize, Scale); PARAM_COUNT] = [
    (2, Scale::Unsigned(0.1)),    // NC_0.3
    (4, Scale::Unsigned(0.1)),    // NC_0.5
    (6, Scale::Unsigned(0.1)),    // NC_1.0
    (8, Scale::Unsigned(0.1)),    // NC_2.5
    (10, Scale::Unsigned(0.1)),   // NC_4.0
    (12, Scale::Unsigned(0.1)),   // PM1_KCl
    (14, Scale::Unsigned(0.1)),   // PM2.5_KCl
    (16, Scale::Unsigned(0.1)),   // PM10_KCl
    (18, Scale::Unsigned(0.1)),   // PM1_Smoke
    (20, Scale::Unsigned(0.1)),   // PM2.5_Smoke
    (22, Scale::Unsigned(0.1)),   // PM10_Smoke
    (24, Scale::Signed(0.01)),    // Temperature_C
    (26, Scale::Unsigned(0.01)),  // Humidity_pct
    (28, Scale::Unsigned(0.005)), // TVOC_ppm
    (30, Scale::Unsigned(1.0)),   // eCO2_ppm
    (32, Scale::Unsigned(0.01)),  // IAQ
    (34, Scale::Unsigned(1.0)),   // Relative_IAQ
];

/// One decoded sample: every channel of one frame, plus metadata
///
/// Invariant: a `Reading` always carries a value for every [`Parameter`].
/// A frame either decodes completely or not at all; there are no partial
/// readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Raw device status bitfield
    pub status: u16,
    /// Decoded values, indexed by [`Parameter::index`]
    values: [f32; PARAM_COUNT],
    /// Trailing integrity byte, carried as a diagnostic (not verified)
    pub integrity: u8,
}

impl Reading {
    /// Value of one parameter
    #[inline]
    pub fn get(&self, parameter: Parameter) -> f32 {
        self.values[parameter.index()]
    }

    /// Iterate over `(parameter, value)` pairs in frame order
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f32)> + '_ {
        Parameter::ALL.iter().map(move |&p| (p, self.get(p)))
    }

    /// Build a reading directly from per-parameter values
    ///
    /// Mainly for tests and synthetic sources; values are rounded to the
    /// same 4-decimal precision the decoder applies.
    pub fn from_values(
        timestamp: Timestamp,
        status: u16,
        values: [f32; PARAM_COUNT],
        integrity: u8,
    ) -> Self {
        let mut rounded = values;
        for v in rounded.iter_mut() {
            *v = round4(*v);
        }
        Self {
            timestamp,
            status,
            values: rounded,
            integrity,
        }
    }
}

/// Round to 4 decimal places
///
/// Applied exactly once, at decode time. Uses `libm` so the core stays
/// `no_std` clean.
#[inline]
pub fn round4(value: f32) -> f32 {
    libm::roundf(value * DECIMALS) / DECIMALS
}

/// Big-endian unsigned 16-bit register at `offset`
#[inline]
fn u16_at(frame: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([frame[offset], frame[offset + 1]])
}

/// Big-endian signed 16-bit register at `offset`
#[inline]
fn i16_at(frame: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([frame[offset], frame[offset + 1]])
}

/// Decode one raw frame captured at `timestamp`
///
/// Accepts any buffer of at least [`FRAME_LEN`] bytes (extra bytes are
/// ignored); anything shorter fails with [`FrameError::ShortFrame`] and
/// produces no reading.
pub fn decode(frame: &[u8], timestamp: Timestamp) -> Result<Reading, FrameError> {
    if frame.len() < FRAME_LEN {
        return Err(FrameError::ShortFrame {
            expected: FRAME_LEN,
            actual: frame.len(),
        });
    }

    let mut values = [0.0f32; PARAM_COUNT];
    for (slot, (offset, scale)) in values.iter_mut().zip(LAYOUT.iter()) {
        let raw = match scale {
            Scale::Unsigned(factor) => u16_at(frame, *offset) as f32 * factor,
            Scale::Signed(factor) => i16_at(frame, *offset) as f32 * factor,
        };
        *slot = round4(raw);
    }

    Ok(Reading {
        timestamp,
        status: u16_at(frame, 0),
        values,
        integrity: frame[FRAME_LEN - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write a big-endian u16 register into a frame buffer
    fn put_u16(frame: &mut [u8], offset: usize, raw: u16) {
        frame[offset..offset + 2].copy_from_slice(&raw.to_be_bytes());
    }

    #[test]
    fn short_frame_rejected() {
        let buf = [0u8; 12];
        let err = decode(&buf, 0).unwrap_err();
        assert_eq!(
            err,
            FrameError::ShortFrame {
                expected: FRAME_LEN,
                actual: 12
            }
        );
    }

    #[test]
    fn round_trip_temperature() {
        let mut buf = [0u8; FRAME_LEN];
        // Raw register 2500 with the 0.01 scale is exactly 25.00 °C
        put_u16(&mut buf, 24, 2500);

        let reading = decode(&buf, 1000).unwrap();
        assert_eq!(reading.get(Parameter::TemperatureC), 25.0);
    }

    #[test]
    fn negative_temperature_is_signed() {
        let mut buf = [0u8; FRAME_LEN];
        // -12.5 °C encodes as -1250 in two's complement
        put_u16(&mut buf, 24, (-1250i16) as u16);

        let reading = decode(&buf, 0).unwrap();
        assert_eq!(reading.get(Parameter::TemperatureC), -12.5);
    }

    #[test]
    fn round_trip_all_scaled_channels() {
        let mut buf = [0u8; FRAME_LEN];
        put_u16(&mut buf, 0, 0x8001); // status
        put_u16(&mut buf, 2, 123); // NC_0.3 -> 12.3
        put_u16(&mut buf, 12, 150); // PM1_KCl -> 15.0
        put_u16(&mut buf, 26, 5550); // Humidity -> 55.5
        put_u16(&mut buf, 28, 200); // TVOC -> 1.0
        put_u16(&mut buf, 30, 650); // eCO2 -> 650
        put_u16(&mut buf, 32, 250); // IAQ -> 2.5
        put_u16(&mut buf, 34, 97); // Relative_IAQ -> 97
        buf[36] = 0xAB;

        let reading = decode(&buf, 42).unwrap();
        assert_eq!(reading.status, 0x8001);
        assert_eq!(reading.get(Parameter::Nc0p3), 12.3);
        assert_eq!(reading.get(Parameter::Pm1Kcl), 15.0);
        assert_eq!(reading.get(Parameter::HumidityPct), 55.5);
        assert_eq!(reading.get(Parameter::TvocPpm), 1.0);
        assert_eq!(reading.get(Parameter::Eco2Ppm), 650.0);
        assert_eq!(reading.get(Parameter::Iaq), 2.5);
        assert_eq!(reading.get(Parameter::RelativeIaq), 97.0);
        assert_eq!(reading.integrity, 0xAB);
        assert_eq!(reading.timestamp, 42);
    }

    #[test]
    fn values_rounded_to_four_decimals() {
        // 0.1 is not exact in binary; the decoder must still report a
        // value that equals the 4-decimal rounding of raw × scale.
        let mut buf = [0u8; FRAME_LEN];
        put_u16(&mut buf, 2, 7); // 7 × 0.1 = 0.7

        let reading = decode(&buf, 0).unwrap();
        assert_eq!(reading.get(Parameter::Nc0p3), round4(0.7));
    }

    #[test]
    fn every_parameter_has_a_value() {
        let buf = [0u8; FRAME_LEN];
        let reading = decode(&buf, 0).unwrap();
        for (_, value) in reading.iter() {
            assert!(value.is_finite());
        }
    }

    #[test]
    fn name_lookup_round_trips() {
        for p in Parameter::ALL {
            assert_eq!(Parameter::from_name(p.name()), Some(p));
        }
        assert_eq!(Parameter::from_name("Pressure_hPa"), None);
    }
}
