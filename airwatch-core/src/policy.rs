//! Threshold Policy: Per-Parameter Limits and the Exposure Rule
//!
//! ## Overview
//!
//! A [`ThresholdSpec`] describes when a parameter's rolling average is
//! unacceptable: above an optional `max`, below an optional `min`, and how
//! many *consecutive* violating check cycles (`required_exposure`) must
//! accumulate before an alert fires. The [`ThresholdPolicy`] is the full
//! table, one optional spec per parameter.
//!
//! ## The Limit That Was Crossed
//!
//! A spec can carry both bounds, so "the limit" is ambiguous until a
//! concrete average violates a concrete bound. The violation check
//! therefore returns a [`Limit`] capturing *which* bound was crossed and
//! its value at detection time; the alert stores that, it is never
//! re-derived later.
//!
//! Parameters with no spec are never evaluated at all - absence means
//! "unmonitored", not "monitored with infinite limits".

use core::fmt;
use core::num::NonZeroU32;

use crate::frame::{Parameter, PARAM_COUNT};

/// The specific bound a rolling average crossed, captured at detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// Average exceeded the configured maximum
    Max(f32),
    /// Average fell below the configured minimum
    Min(f32),
}

impl Limit {
    /// Numeric value of the crossed bound
    pub fn value(&self) -> f32 {
        match self {
            Limit::Max(v) | Limit::Min(v) => *v,
        }
    }

    /// Direction label, for log lines
    pub const fn direction(&self) -> &'static str {
        match self {
            Limit::Max(_) => "HIGH",
            Limit::Min(_) => "LOW",
        }
    }
}

impl fmt::Display for Limit {
    /// Prints only the numeric bound; the alert log column carries just
    /// the number, matching the on-disk schema.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Limit configuration for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default, deny_unknown_fields)
)]
pub struct ThresholdSpec {
    /// Alert when the average rises above this
    pub max: Option<f32>,
    /// Alert when the average falls below this
    pub min: Option<f32>,
    /// Consecutive violating checks required before alerting
    ///
    /// `None` means alert immediately on any violating check.
    pub required_exposure: Option<NonZeroU32>,
}

impl ThresholdSpec {
    /// Spec with only an upper bound
    pub fn max(value: f32) -> Self {
        Self {
            max: Some(value),
            ..Self::default()
        }
    }

    /// Spec with only a lower bound
    pub fn min(value: f32) -> Self {
        Self {
            min: Some(value),
            ..Self::default()
        }
    }

    /// Add a debounce requirement of `checks` consecutive violations
    pub fn with_exposure(mut self, checks: u32) -> Self {
        self.required_exposure = NonZeroU32::new(checks);
        self
    }

    /// Test an average against this spec
    ///
    /// Returns the [`Limit`] that was crossed, or `None` when the average
    /// is acceptable. `max` wins when both bounds are somehow violated
    /// (only possible with an inverted spec).
    pub fn check(&self, average: f32) -> Option<Limit> {
        if let Some(max) = self.max {
            if average > max {
                return Some(Limit::Max(max));
            }
        }
        if let Some(min) = self.min {
            if average < min {
                return Some(Limit::Min(min));
            }
        }
        None
    }
}

/// The full per-parameter limit table
#[derive(Debug, Clone, Default)]
pub struct ThresholdPolicy {
    specs: [Option<ThresholdSpec>; PARAM_COUNT],
}

impl ThresholdPolicy {
    /// Empty policy: nothing is monitored
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the spec for one parameter
    pub fn set(&mut self, parameter: Parameter, spec: ThresholdSpec) {
        self.specs[parameter.index()] = Some(spec);
    }

    /// Spec for one parameter, if configured
    #[inline]
    pub fn get(&self, parameter: Parameter) -> Option<&ThresholdSpec> {
        self.specs[parameter.index()].as_ref()
    }

    /// Iterate over configured `(parameter, spec)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, &ThresholdSpec)> {
        Parameter::ALL
            .iter()
            .filter_map(move |&p| self.get(p).map(|spec| (p, spec)))
    }

    /// Number of monitored parameters
    pub fn len(&self) -> usize {
        self.specs.iter().filter(|s| s.is_some()).count()
    }

    /// Check if nothing is monitored
    pub fn is_empty(&self) -> bool {
        self.specs.iter().all(Option::is_none)
    }

    /// Default indoor air-quality limit table
    ///
    /// Exposure requirements are deliberately absent so every violation
    /// alerts immediately; deployments add debounce per parameter in
    /// their config once baseline noise is understood.
    pub fn indoor_default() -> Self {
        let mut policy = Self::new();
        policy.set(Parameter::TemperatureC, ThresholdSpec::max(35.0));
        policy.set(Parameter::HumidityPct, ThresholdSpec::max(70.0));
        policy.set(Parameter::Pm1Kcl, ThresholdSpec::max(15.0));
        policy.set(Parameter::Pm2p5Kcl, ThresholdSpec::max(20.0));
        policy.set(Parameter::Pm10Kcl, ThresholdSpec::max(50.0));
        policy.set(Parameter::Pm1Smoke, ThresholdSpec::max(20.0));
        policy.set(Parameter::Pm2p5Smoke, ThresholdSpec::max(20.0));
        policy.set(Parameter::Pm10Smoke, ThresholdSpec::max(50.0));
        policy.set(Parameter::TvocPpm, ThresholdSpec::max(300.0));
        policy.set(Parameter::Eco2Ppm, ThresholdSpec::max(1000.0));
        policy.set(Parameter::Iaq, ThresholdSpec::max(5.0));
        policy.set(Parameter::RelativeIaq, ThresholdSpec::max(200.0));
        policy
    }
}
