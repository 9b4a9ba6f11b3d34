//! `airwatch-ingest` - the 1 Hz sampling process
//!
//! Reads one frame per second from the sensor bus, decodes it and appends
//! it to the hour-rotated reading store. Usage:
//!
//! ```text
//! airwatch-ingest [config.json]
//! ```
//!
//! Without a config argument the reference defaults apply (store in the
//! current directory, 1 s cadence). This build drives the synthetic bus;
//! a hardware deployment swaps in its platform's `SensorBus`
//! implementation and changes nothing else.

use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};

use airwatch_core::time::SystemClock;
use airwatch_core::ReadingStore;
use airwatch_node::ingest;
use airwatch_node::synth::SyntheticBus;
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

    let store = match ReadingStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(error) => {
            error!("cannot open reading store in {}: {}", config.data_dir, error);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "airwatch-ingest v{} started, store dir {}, interval {}s",
        airwatch_core::VERSION,
        config.data_dir,
        config.log_interval_secs,
    );

    let mut bus = SyntheticBus::new();
    ingest::run(&mut bus, &store, &SystemClock, config.log_interval())
}
