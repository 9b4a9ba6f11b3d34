//! Node configuration
//!
//! One JSON file configures both loops: directories, cadences, the
//! rolling-window size and the per-parameter limit table. Limits are keyed
//! by the canonical parameter names (`Temperature_C`, `PM1_KCl`, ...)
//! exactly as they appear in the CSV headers; an unknown key is a config
//! error, not something to skip silently - a typo in a limit name must
//! not quietly disable monitoring for that parameter.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror_no_std::Error;

use airwatch_core::{Parameter, ThresholdPolicy, ThresholdSpec};

/// Errors raised while loading or interpreting a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected schema
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Limit table references a parameter the decoder does not produce
    #[error("unknown parameter in limits: {name}")]
    UnknownParameter {
        /// The offending key as written in the config
        name: String,
    },
}

/// Full configuration of one sensor node
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Directory holding the hour-rotated reading store
    pub data_dir: String,
    /// Directory holding the hour-rotated alert log
    pub alert_dir: String,
    /// Rolling-window size W in samples
    pub sample_window: usize,
    /// Watchdog check cadence in seconds
    pub check_interval_secs: u64,
    /// Ingest cadence in seconds
    pub log_interval_secs: u64,
    /// Per-parameter limit table, keyed by canonical parameter name
    pub limits: BTreeMap<String, ThresholdSpec>,
}

impl Default for NodeConfig {
    /// Defaults mirror the reference deployment: 1 Hz ingest, 10 s
    /// checks, a 60-sample (one minute) smoothing window, and the
    /// standard indoor limit table.
    fn default() -> Self {
        let mut limits = BTreeMap::new();
        for (parameter, spec) in ThresholdPolicy::indoor_default().iter() {
            limits.insert(parameter.name().to_string(), *spec);
        }
        Self {
            data_dir: ".".to_string(),
            alert_dir: "./alerts".to_string(),
            sample_window: 60,
            check_interval_secs: 10,
            log_interval_secs: 1,
            limits,
        }
    }
}

impl NodeConfig {
    /// Load a config file, or fall back to defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&raw)?;
        // Validate limit keys eagerly so a typo fails startup, not the
        // first check cycle.
        config.policy()?;
        Ok(config)
    }

    /// Build the core policy from the limit table
    pub fn policy(&self) -> Result<ThresholdPolicy, ConfigError> {
        let mut policy = ThresholdPolicy::new();
        for (name, spec) in &self.limits {
            let parameter =
                Parameter::from_name(name).ok_or_else(|| ConfigError::UnknownParameter {
                    name: name.clone(),
                })?;
            policy.set(parameter, *spec);
        }
        Ok(policy)
    }

    /// Watchdog cadence as a `Duration`
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Ingest cadence as a `Duration`
    pub fn log_interval(&self) -> Duration {
        Duration::from_secs(self.log_interval_secs)
    }
}
