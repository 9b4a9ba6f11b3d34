//! Alert Escalation: From Averages to Persisted, Signalled Alerts
//!
//! ## Overview
//!
//! Once per check cycle the escalator walks every monitored parameter,
//! runs the exposure state machine against the cycle's averages, and
//! collects the alerts the policy says to fire. With the `std` feature it
//! also owns the cycle's side effects: appending the alerts to the
//! hour-rotated alert log and firing the indicator exactly once.
//!
//! ## Evaluation Order (fixed by contract)
//!
//! For each parameter that has both a spec and an average this cycle:
//!
//! 1. Violation test - which bound, if any, does the average cross?
//! 2. Counter update - increment on violation, reset to zero otherwise.
//! 3. Firing decision, against the *updated* counter:
//!    - `required_exposure = Some(n)`: fire iff counter ≥ n
//!    - `None`: fire iff violated at all
//!
//! Because the counter keeps climbing while the violation persists, a
//! debounced parameter fires on its crossing cycle and on every violating
//! cycle after it. That repetition is deliberate; "alert once per
//! episode" is a possible extension, not the default.
//!
//! A parameter with a spec but no average this cycle (empty window) is
//! skipped entirely - its counter is neither bumped nor reset, since
//! nothing was observed either way.

use heapless::Vec;

use crate::exposure::ExposureTracker;
use crate::frame::{Parameter, PARAM_COUNT};
use crate::policy::{Limit, ThresholdPolicy};
use crate::time::Timestamp;
use crate::window::Averages;

/// One fired alert: an immutable record of a policy decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    /// Parameter whose average violated its spec
    pub parameter: Parameter,
    /// The rolling average that triggered the alert
    pub average: f32,
    /// The specific bound crossed, captured at detection time
    pub limit: Limit,
    /// Exposure counter value when the alert fired
    pub exposure: u32,
    /// Configured rolling-window size W, for interpreting `average`
    pub sample_window: usize,
    /// When the check cycle ran
    pub timestamp: Timestamp,
}

/// Drives the per-cycle evaluation and owns the exposure counters
pub struct AlertEscalator {
    policy: ThresholdPolicy,
    tracker: ExposureTracker,
    sample_window: usize,
}

impl AlertEscalator {
    /// Create an escalator with all exposure counters at zero
    pub fn new(policy: ThresholdPolicy, sample_window: usize) -> Self {
        Self {
            policy,
            tracker: ExposureTracker::new(),
            sample_window,
        }
    }

    /// The policy this escalator evaluates against
    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Current exposure counter for a parameter (diagnostics, tests)
    pub fn exposure(&self, parameter: Parameter) -> u32 {
        self.tracker.count(parameter)
    }

    /// Evaluate one check cycle; returns the alerts that fired
    ///
    /// Pure except for the counter updates: no I/O, no indicator. At most
    /// one alert per parameter per cycle, in frame order.
    pub fn evaluate(&mut self, averages: &Averages, now: Timestamp) -> Vec<Alert, PARAM_COUNT> {
        let mut alerts = Vec::new();

        for (parameter, spec) in self.policy.iter() {
            let Some(average) = averages.get(parameter) else {
                continue;
            };

            let violation = spec.check(average);
            let counter = self.tracker.observe(parameter, violation.is_some());

            let Some(limit) = violation else {
                continue;
            };

            let fire = match spec.required_exposure {
                Some(required) => counter >= required.get(),
                None => true,
            };

            if fire {
                // Cannot overflow: at most one alert per parameter
                let _ = alerts.push(Alert {
                    parameter,
                    average,
                    limit,
                    exposure: counter,
                    sample_window: self.sample_window,
                    timestamp: now,
                });
            }
        }

        alerts
    }
}

#[cfg(feature = "std")]
mod escalate {
    use super::*;
    use crate::errors::StoreError;
    use crate::indicator::{Indicator, ALERT_PULSES, PULSE_OFF, PULSE_ON};
    use crate::store::AlertLog;

    impl AlertEscalator {
        /// Run one full escalation cycle: evaluate, persist, signal
        ///
        /// When any alert fired this cycle, every alert is appended to the
        /// current hour's log first, then the indicator is pulsed exactly
        /// once for the whole cycle - one burst means "at least one alert
        /// this cycle", not "N alerts". A quiet cycle touches neither.
        ///
        /// A log write failure skips the indicator too: an operator
        /// watching the light should be able to trust that a burst has a
        /// matching row on disk.
        pub fn escalate<I: Indicator>(
            &mut self,
            averages: &Averages,
            now: Timestamp,
            log: &AlertLog,
            indicator: &mut I,
        ) -> Result<Vec<Alert, PARAM_COUNT>, StoreError> {
            let alerts = self.evaluate(averages, now);

            if !alerts.is_empty() {
                log.append(&alerts)?;
                indicator.signal(ALERT_PULSES, PULSE_ON, PULSE_OFF);
            }

            Ok(alerts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ThresholdSpec;
    use crate::window::Averages;

    fn escalator_with(parameter: Parameter, spec: ThresholdSpec) -> AlertEscalator {
        let mut policy = ThresholdPolicy::new();
        policy.set(parameter, spec);
        AlertEscalator::new(policy, 60)
    }

    #[test]
    fn immediate_alert_without_exposure_requirement() {
        let mut escalator = escalator_with(Parameter::TemperatureC, ThresholdSpec::max(35.0));
        let averages = Averages::for_test(&[(Parameter::TemperatureC, 36.0)]);

        // Every violating cycle fires, every time
        for cycle in 1..=5u32 {
            let alerts = escalator.evaluate(&averages, cycle as u64 * 10_000);
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].parameter, Parameter::TemperatureC);
            assert_eq!(alerts[0].average, 36.0);
            assert_eq!(alerts[0].limit, Limit::Max(35.0));
            assert_eq!(alerts[0].exposure, cycle);
            assert_eq!(alerts[0].sample_window, 60);
        }
    }

    #[test]
    fn debounce_gates_until_required_exposure() {
        let mut escalator =
            escalator_with(Parameter::Pm1Kcl, ThresholdSpec::max(15.0).with_exposure(3));
        let violating = Averages::for_test(&[(Parameter::Pm1Kcl, 16.2)]);

        // Cycles 1 and 2: counting, not yet alerting
        assert!(escalator.evaluate(&violating, 10).is_empty());
        assert!(escalator.evaluate(&violating, 20).is_empty());

        // Cycle 3: threshold met, alert fires with the counter captured
        let alerts = escalator.evaluate(&violating, 30);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].exposure, 3);

        // Cycle 4: still violating, fires again (no single-shot suppression)
        let alerts = escalator.evaluate(&violating, 40);
        assert_eq!(alerts[0].exposure, 4);
    }

    #[test]
    fn recovery_resets_the_debounce() {
        let mut escalator =
            escalator_with(Parameter::Pm1Kcl, ThresholdSpec::max(15.0).with_exposure(3));
        let violating = Averages::for_test(&[(Parameter::Pm1Kcl, 16.0)]);
        let acceptable = Averages::for_test(&[(Parameter::Pm1Kcl, 5.0)]);

        escalator.evaluate(&violating, 10);
        escalator.evaluate(&violating, 20);
        escalator.evaluate(&acceptable, 30); // transient spike over
        assert_eq!(escalator.exposure(Parameter::Pm1Kcl), 0);

        // Two more violations are again short of the requirement
        assert!(escalator.evaluate(&violating, 40).is_empty());
        assert!(escalator.evaluate(&violating, 50).is_empty());
    }

    #[test]
    fn missing_average_leaves_counter_untouched() {
        let mut escalator =
            escalator_with(Parameter::Pm1Kcl, ThresholdSpec::max(15.0).with_exposure(2));
        let violating = Averages::for_test(&[(Parameter::Pm1Kcl, 16.0)]);
        let empty = Averages::default();

        escalator.evaluate(&violating, 10);
        assert_eq!(escalator.exposure(Parameter::Pm1Kcl), 1);

        // No samples this cycle: nothing observed, counter holds
        assert!(escalator.evaluate(&empty, 20).is_empty());
        assert_eq!(escalator.exposure(Parameter::Pm1Kcl), 1);

        let alerts = escalator.evaluate(&violating, 30);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].exposure, 2);
    }

    #[test]
    fn min_bound_captured_on_alert() {
        let mut escalator = escalator_with(Parameter::HumidityPct, ThresholdSpec::min(30.0));
        let averages = Averages::for_test(&[(Parameter::HumidityPct, 12.5)]);

        let alerts = escalator.evaluate(&averages, 100);
        assert_eq!(alerts[0].limit, Limit::Min(30.0));
        assert_eq!(alerts[0].limit.direction(), "LOW");
    }

    #[test]
    fn unmonitored_parameters_never_alert() {
        let mut escalator = AlertEscalator::new(ThresholdPolicy::new(), 60);
        let averages = Averages::for_test(&[(Parameter::TemperatureC, 900.0)]);

        assert!(escalator.evaluate(&averages, 0).is_empty());
    }

    #[test]
    fn one_cycle_can_fire_multiple_parameters() {
        let mut policy = ThresholdPolicy::new();
        policy.set(Parameter::TemperatureC, ThresholdSpec::max(35.0));
        policy.set(Parameter::Eco2Ppm, ThresholdSpec::max(1000.0));
        let mut escalator = AlertEscalator::new(policy, 60);

        let averages = Averages::for_test(&[
            (Parameter::TemperatureC, 40.0),
            (Parameter::Eco2Ppm, 1500.0),
            (Parameter::HumidityPct, 50.0),
        ]);

        let alerts = escalator.evaluate(&averages, 0);
        assert_eq!(alerts.len(), 2);
    }
}
