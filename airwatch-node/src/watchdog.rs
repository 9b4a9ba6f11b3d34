//! Watchdog loop: store → windows → policy → alerts → indicator
//!
//! Runs on a slower cadence than ingest (default every 10 s). Each cycle
//! is strictly sequential: locate the latest store file, read the recent
//! rows, refill the rolling windows, evaluate the policy, persist any
//! alerts and pulse the indicator once. The indicator call blocks, and
//! that delay before the next tick is accepted by design - the check
//! cadence is "at least N seconds apart", not "exactly every N seconds".
//!
//! Containment rule: a missing store is "nothing to check yet" (the
//! ingest process may not have started); any other failure logs and
//! abandons the cycle. The loop never exits on its own.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use airwatch_core::indicator::Indicator;
use airwatch_core::time::TimeSource;
use airwatch_core::{AlertEscalator, AlertLog, ReadingStore, RollingAggregator, StoreError};

/// One watchdog cycle; returns how many alerts fired
pub fn check_once<I: Indicator>(
    store: &ReadingStore,
    alert_log: &AlertLog,
    aggregator: &mut RollingAggregator,
    escalator: &mut AlertEscalator,
    indicator: &mut I,
    clock: &impl TimeSource,
    sample_window: usize,
) -> Result<usize, StoreError> {
    let rows = store.read_recent(sample_window)?;
    aggregator.refill(&rows);

    let averages = aggregator.averages();
    let alerts = escalator.escalate(&averages, clock.now(), alert_log, indicator)?;

    for alert in &alerts {
        info!(
            "ALERT {}: avg {:.4} crossed {} {} (exposure {}, window {})",
            alert.parameter.name(),
            alert.average,
            alert.limit.direction(),
            alert.limit,
            alert.exposure,
            alert.sample_window,
        );
    }
    Ok(alerts.len())
}

/// Run the watchdog loop until the process is terminated
pub fn run<I: Indicator>(
    store: &ReadingStore,
    alert_log: &AlertLog,
    escalator: &mut AlertEscalator,
    indicator: &mut I,
    clock: &impl TimeSource,
    interval: Duration,
    sample_window: usize,
) -> ! {
    let mut aggregator = RollingAggregator::new(sample_window);

    loop {
        match check_once(
            store,
            alert_log,
            &mut aggregator,
            escalator,
            indicator,
            clock,
            sample_window,
        ) {
            Ok(0) => debug!("check cycle clean"),
            Ok(fired) => debug!("check cycle fired {} alert(s)", fired),
            Err(StoreError::NoStore { ref dir }) => {
                debug!("no store file in {} yet, waiting", dir)
            }
            Err(error) => warn!("check cycle abandoned: {}", error),
        }

        thread::sleep(interval);
    }
}
