//! Hour-Rotated CSV Stores for Readings and Alerts
//!
//! ## Overview
//!
//! Both persistent surfaces of the pipeline live here: the
//! [`ReadingStore`] that the ingest loop appends one row per sample to,
//! and the [`AlertLog`] the escalator appends fired alerts to. Each is an
//! append-only CSV scoped to one calendar hour, with a sortable
//! zero-padded filename embedding year-month-day-hour:
//!
//! ```text
//! airwatch_2024-03-01_14.csv     (readings)
//! alerts_20240301_14.csv         (alerts)
//! ```
//!
//! The instant a record's hour differs from the previous file's, a new
//! file is created with a fresh header; prior files are never reopened
//! for writing. Because the names are zero-padded, lexical ordering over
//! the directory equals chronological ordering - which is exactly how
//! [`ReadingStore::latest_path`] discovers the active file. Preserve the
//! naming scheme or discovery breaks.
//!
//! ## Resource Discipline
//!
//! `append` opens, writes, flushes and closes on every call. One open
//! file handle per operation with guaranteed release on every exit path
//! means calling it once per second indefinitely accumulates nothing.
//!
//! ## Concurrency Model
//!
//! One writer per store (the ingest process for readings, the watchdog
//! for alerts); any number of independent reader processes. Readers must
//! assume the last line may be mid-append: [`ReadingStore::read_recent`]
//! drops a trailing line that lacks its newline and skips individual
//! unparsable fields rather than failing the read. No file locking.
//!
//! ## Known Limitation
//!
//! `read_recent` reads the *latest file only*. Right after an hour
//! boundary the rolling window briefly loses continuity because the
//! previous hour's samples are in a file it does not open. Preserved
//! source behavior; spanning the preceding file as well would resolve it.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use log::{debug, info};

use crate::alert::Alert;
use crate::errors::StoreError;
use crate::frame::{Parameter, Reading, PARAM_COUNT};
use crate::time::Timestamp;

/// Filename prefix of reading store files
pub const READING_PREFIX: &str = "airwatch_";

/// Filename prefix of alert log files
pub const ALERT_PREFIX: &str = "alerts_";

/// Convert a pipeline timestamp to local calendar time
fn local_datetime(timestamp: Timestamp) -> Result<DateTime<Local>, StoreError> {
    Local
        .timestamp_millis_opt(timestamp as i64)
        .earliest()
        .ok_or(StoreError::TimeRange)
}

/// Open for append, creating with `header` when the file does not exist
///
/// Single-writer discipline makes the exists-then-create window benign.
fn open_hourly(path: &Path, header: &str) -> Result<File, StoreError> {
    let fresh = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if fresh {
        info!("starting new log file {}", path.display());
        writeln!(file, "{}", header)?;
    }
    Ok(file)
}

/// One row read back from the reading store, schema-tolerant
///
/// A field that was missing or unparsable in the CSV is `None`; the rest
/// of the row is still usable. Timestamps and status are not carried -
/// aggregation only consumes parameter values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecentRow {
    values: [Option<f32>; PARAM_COUNT],
}

impl RecentRow {
    /// Iterate over the fields that parsed
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f32)> + '_ {
        Parameter::ALL
            .iter()
            .filter_map(move |&p| self.values[p.index()].map(|v| (p, v)))
    }

    /// Value of one parameter, if it parsed
    pub fn get(&self, parameter: Parameter) -> Option<f32> {
        self.values[parameter.index()]
    }
}

/// Hour-rotated append log of decoded readings
pub struct ReadingStore {
    dir: PathBuf,
}

impl ReadingStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file owning the hour that contains `timestamp`
    pub fn path_for(&self, timestamp: Timestamp) -> Result<PathBuf, StoreError> {
        let stamp = local_datetime(timestamp)?.format("%Y-%m-%d_%H");
        Ok(self.dir.join(format!("{READING_PREFIX}{stamp}.csv")))
    }

    /// Header row matching the schema `append` writes
    pub fn header() -> String {
        let mut header = String::from("timestamp,status");
        for parameter in Parameter::ALL {
            header.push(',');
            header.push_str(parameter.name());
        }
        header.push_str(",crc");
        header
    }

    /// Append one reading to its hour's file
    ///
    /// Opens (creating with header if absent), writes one row, flushes and
    /// closes before returning. Rotation needs no special case: a reading
    /// in a new hour simply maps to a file that does not exist yet.
    pub fn append(&self, reading: &Reading) -> Result<(), StoreError> {
        let path = self.path_for(reading.timestamp)?;
        let mut file = open_hourly(&path, &Self::header())?;

        let mut row = format!(
            "{},{}",
            local_datetime(reading.timestamp)?.format("%Y-%m-%dT%H:%M:%S%.3f"),
            reading.status,
        );
        for (_, value) in reading.iter() {
            row.push(',');
            row.push_str(&value.to_string());
        }
        row.push(',');
        row.push_str(&reading.integrity.to_string());

        writeln!(file, "{}", row)?;
        file.flush()?;
        Ok(())
    }

    /// Locate the most recent store file by name ordering
    ///
    /// Lexical max over the zero-padded names is chronological max. Fails
    /// with [`StoreError::NoStore`] when the directory holds no store file
    /// yet (the ingest process has not written anything).
    pub fn latest_path(&self) -> Result<PathBuf, StoreError> {
        let mut latest: Option<String> = None;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(READING_PREFIX) && name.ends_with(".csv") {
                if latest.as_deref().map_or(true, |cur| name > cur) {
                    latest = Some(name.to_string());
                }
            }
        }
        match latest {
            Some(name) => Ok(self.dir.join(name)),
            None => Err(StoreError::NoStore {
                dir: self.dir.display().to_string(),
            }),
        }
    }

    /// Read up to `window` most recent rows from the latest file
    ///
    /// Rows come back oldest-first, ready to feed a rolling window. The
    /// header is mapped by column name, so extra or reordered columns are
    /// tolerated; unknown columns are ignored. A field that fails to parse
    /// is skipped, not the row, and a trailing line without its newline
    /// (a concurrent append in flight) is ignored entirely.
    pub fn read_recent(&self, window: usize) -> Result<Vec<RecentRow>, StoreError> {
        let path = self.latest_path()?;
        let mut content = String::new();
        File::open(&path)?.read_to_string(&mut content)?;

        // Only lines that have been fully written (newline present) count.
        let body: &str = if content.ends_with('\n') {
            &content
        } else {
            match content.rfind('\n') {
                Some(idx) => &content[..=idx],
                None => "",
            }
        };

        let mut lines = body.lines();
        let Some(header) = lines.next() else {
            return Ok(Vec::new());
        };

        // Column index -> parameter, from the file's own header
        let columns: Vec<Option<Parameter>> =
            header.split(',').map(Parameter::from_name).collect();

        let mut rows: std::collections::VecDeque<RecentRow> =
            std::collections::VecDeque::with_capacity(window);
        for line in lines {
            let mut row = RecentRow::default();
            for (field, parameter) in line.split(',').zip(columns.iter()) {
                let Some(parameter) = parameter else { continue };
                if let Ok(value) = field.trim().parse::<f32>() {
                    row.values[parameter.index()] = Some(value);
                }
            }
            if rows.len() == window {
                rows.pop_front();
            }
            rows.push_back(row);
        }

        debug!(
            "read {} recent rows from {}",
            rows.len(),
            path.display()
        );
        Ok(rows.into_iter().collect())
    }
}

/// Hour-rotated append log of fired alerts
///
/// Same rotation and header discipline as [`ReadingStore`], different
/// schema and naming scheme.
pub struct AlertLog {
    dir: PathBuf,
}

impl AlertLog {
    /// Columns of one alert row
    pub const HEADER: &'static str =
        "timestamp,parameter,average_value,limit,exposure_samples,sample_window";

    /// Open an alert log rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this log writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file owning the hour that contains `timestamp`
    pub fn path_for(&self, timestamp: Timestamp) -> Result<PathBuf, StoreError> {
        let stamp = local_datetime(timestamp)?.format("%Y%m%d_%H");
        Ok(self.dir.join(format!("{ALERT_PREFIX}{stamp}.csv")))
    }

    /// Append one check cycle's alerts as one row each
    ///
    /// An empty slice is a no-op: quiet cycles must not create files. The
    /// average is written with fixed 4-decimal formatting and the limit
    /// column carries the numeric bound that was crossed.
    pub fn append(&self, alerts: &[Alert]) -> Result<(), StoreError> {
        let Some(first) = alerts.first() else {
            return Ok(());
        };

        let path = self.path_for(first.timestamp)?;
        let mut file = open_hourly(&path, Self::HEADER)?;

        for alert in alerts {
            writeln!(
                file,
                "{},{},{:.4},{},{},{}",
                local_datetime(alert.timestamp)?.format("%Y-%m-%dT%H:%M:%S%.3f"),
                alert.parameter.name(),
                alert.average,
                alert.limit,
                alert.exposure,
                alert.sample_window,
            )?;
        }
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::round4;
    use crate::policy::Limit;
    use tempfile::tempdir;

    fn reading_at(timestamp: Timestamp, temperature: f32) -> Reading {
        let mut values = [0.0f32; PARAM_COUNT];
        values[Parameter::TemperatureC.index()] = temperature;
        Reading::from_values(timestamp, 0, values, 0x5A)
    }

    #[test]
    fn append_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        store.append(&reading_at(1_700_000_000_000, 21.5)).unwrap();

        let path = store.latest_path().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), ReadingStore::header());
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn latest_path_is_lexical_max() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let base = 1_700_000_000_000u64;
        store.append(&reading_at(base, 20.0)).unwrap();
        store.append(&reading_at(base + 3_600_000, 21.0)).unwrap();
        store.append(&reading_at(base + 7_200_000, 22.0)).unwrap();

        let latest = store.latest_path().unwrap();
        assert_eq!(latest, store.path_for(base + 7_200_000).unwrap());
    }

    #[test]
    fn no_store_reported_for_empty_directory() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.latest_path(),
            Err(StoreError::NoStore { .. })
        ));
    }

    #[test]
    fn read_recent_returns_window_tail() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let base = 1_700_000_000_000u64;
        for i in 0..5 {
            store
                .append(&reading_at(base + i * 1000, 20.0 + i as f32))
                .unwrap();
        }

        let rows = store.read_recent(3).unwrap();
        assert_eq!(rows.len(), 3);
        // Oldest-first tail: 22, 23, 24
        let temps: Vec<f32> = rows
            .iter()
            .filter_map(|r| r.get(Parameter::TemperatureC))
            .collect();
        assert_eq!(temps, vec![22.0, 23.0, 24.0]);
    }

    #[test]
    fn read_recent_ignores_partial_trailing_line() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let base = 1_700_000_000_000u64;
        store.append(&reading_at(base, 20.0)).unwrap();

        // Simulate a writer caught mid-append
        let path = store.latest_path().unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "2024-03-01T14:00:02.000,0,1.0,2.").unwrap();
        drop(file);

        let rows = store.read_recent(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Parameter::TemperatureC), Some(20.0));
    }

    #[test]
    fn read_recent_skips_unparsable_fields_not_rows() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let base = 1_700_000_000_000u64;
        store.append(&reading_at(base, 20.0)).unwrap();

        // Hand-write a row whose temperature column is garbage
        let path = store.latest_path().unwrap();
        let mut fields: Vec<String> = vec!["2024-03-01T14:00:02.000".into(), "0".into()];
        for parameter in Parameter::ALL {
            if parameter == Parameter::TemperatureC {
                fields.push("notanumber".into());
            } else {
                fields.push("1.0".into());
            }
        }
        fields.push("90".into());
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{}", fields.join(",")).unwrap();
        drop(file);

        let rows = store.read_recent(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(Parameter::TemperatureC), None);
        assert_eq!(rows[1].get(Parameter::HumidityPct), Some(1.0));
    }

    #[test]
    fn reading_values_survive_the_round_trip() {
        let dir = tempdir().unwrap();
        let store = ReadingStore::open(dir.path()).unwrap();

        let mut values = [0.0f32; PARAM_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = round4(i as f32 * 1.1 + 0.1234);
        }
        let reading = Reading::from_values(1_700_000_000_000, 3, values, 7);
        store.append(&reading).unwrap();

        let rows = store.read_recent(1).unwrap();
        for (parameter, value) in reading.iter() {
            assert_eq!(rows[0].get(parameter), Some(value));
        }
    }

    #[test]
    fn alert_log_rows_and_header() {
        let dir = tempdir().unwrap();
        let log = AlertLog::open(dir.path()).unwrap();

        let alert = Alert {
            parameter: Parameter::TemperatureC,
            average: 36.0,
            limit: Limit::Max(35.0),
            exposure: 1,
            sample_window: 60,
            timestamp: 1_700_000_000_000,
        };
        log.append(&[alert]).unwrap();
        log.append(&[]).unwrap(); // quiet cycle: no effect

        let path = log.path_for(alert.timestamp).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), AlertLog::HEADER);

        let row = lines.next().unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields[1], "Temperature_C");
        assert_eq!(fields[2], "36.0000"); // fixed 4-decimal formatting
        assert_eq!(fields[3], "35");
        assert_eq!(fields[4], "1");
        assert_eq!(fields[5], "60");
        assert!(lines.next().is_none());
    }
}
