//! `airwatch-watchdog` - the threshold evaluation process
//!
//! Every check interval (default 10 s) it re-reads the recent rows from
//! the reading store, smooths them through the rolling windows, evaluates
//! the limit table with the exposure policy, appends fired alerts to the
//! alert log and pulses the indicator. Usage:
//!
//! ```text
//! airwatch-watchdog [config.json]
//! ```
//!
//! Runs as an independent process from `airwatch-ingest`; the two share
//! only the store directory.

use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};

use airwatch_core::time::SystemClock;
use airwatch_core::{AlertEscalator, AlertLog, ReadingStore};
use airwatch_node::indicator::ConsoleIndicator;
use airwatch_node::watchdog;
use airwatch_node::NodeConfig;

fn main() -> ExitCode {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match NodeConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            error!("cannot load config: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let policy = match config.policy() {
        Ok(policy) => policy,
        Err(error) => {
            error!("invalid limit table: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let store = match ReadingStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(error) => {
            error!("cannot open reading store in {}: {}", config.data_dir, error);
            return ExitCode::FAILURE;
        }
    };
    let alert_log = match AlertLog::open(&config.alert_dir) {
        Ok(log) => log,
        Err(error) => {
            error!("cannot open alert log in {}: {}", config.alert_dir, error);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "airwatch-watchdog v{} started, {} monitored parameter(s), window {}, every {}s",
        airwatch_core::VERSION,
        policy.len(),
        config.sample_window,
        config.check_interval_secs,
    );

    let mut escalator = AlertEscalator::new(policy, config.sample_window);
    let mut indicator = ConsoleIndicator;
    watchdog::run(
        &store,
        &alert_log,
        &mut escalator,
        &mut indicator,
        &SystemClock,
        config.check_interval(),
        config.sample_window,
    )
}
