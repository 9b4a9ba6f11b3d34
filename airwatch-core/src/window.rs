//! Rolling Windows and Per-Parameter Aggregation
//!
//! ## Overview
//!
//! The watchdog never compares a single sample against a limit; it smooths
//! the last *W* samples per parameter first. This module provides the
//! bounded [`Window`] that holds those samples and the
//! [`RollingAggregator`] that keeps one window per parameter.
//!
//! ## Design Rationale
//!
//! A window is a FIFO with automatic eviction plus an incrementally
//! maintained sum:
//! - O(1) push (oldest value evicted once capacity is reached)
//! - O(1) mean (sum / len, no rescan)
//! - Zero heap allocations (`heapless::Deque` backing storage)
//!
//! The backing capacity is the compile-time [`MAX_SAMPLE_WINDOW`]; the
//! *effective* capacity W is chosen at runtime from configuration and
//! clamped to the backing size. This keeps memory fixed while letting
//! deployments tune the smoothing window without recompiling.
//!
//! Windows are working state only. They are created empty when the
//! watchdog starts and refilled from the store every check cycle; they are
//! never persisted.

use heapless::Deque;

use crate::frame::{Parameter, Reading, PARAM_COUNT};

/// Compile-time backing capacity of every window
///
/// Runtime window sizes larger than this are clamped. 256 seconds of
/// 1 Hz samples is over four minutes of smoothing, well past the 60 the
/// default configuration uses.
pub const MAX_SAMPLE_WINDOW: usize = 256;

/// Bounded FIFO of the most recent W values with an O(1) running mean
#[derive(Debug, Clone)]
pub struct Window {
    values: Deque<f32, MAX_SAMPLE_WINDOW>,
    capacity: usize,
    sum: f32,
}

impl Window {
    /// Create an empty window with effective capacity `capacity`
    ///
    /// A zero capacity is bumped to 1 (a window that can never hold a
    /// sample would silently disable its parameter), and anything above
    /// [`MAX_SAMPLE_WINDOW`] is clamped down to it.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Deque::new(),
            capacity: capacity.clamp(1, MAX_SAMPLE_WINDOW),
            sum: 0.0,
        }
    }

    /// Push a value, evicting the oldest once the window is at capacity
    pub fn push(&mut self, value: f32) {
        if self.values.len() == self.capacity {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
            }
        }
        // Cannot fail: len < capacity <= MAX_SAMPLE_WINDOW here
        let _ = self.values.push_back(value);
        self.sum += value;
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Effective capacity W
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean over current contents, `None` when empty
    pub fn mean(&self) -> Option<f32> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f32)
        }
    }

    /// Drop all samples and reset the running sum
    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Per-parameter averages for one check cycle
///
/// Parameters with zero samples are *absent*, not zero: reporting 0.0 for
/// a parameter that was never observed would trip `min` limits spuriously.
#[derive(Debug, Clone, Copy, Default)]
pub struct Averages {
    values: [Option<f32>; PARAM_COUNT],
}

impl Averages {
    /// Average for one parameter, `None` if it had no samples
    #[inline]
    pub fn get(&self, parameter: Parameter) -> Option<f32> {
        self.values[parameter.index()]
    }

    /// Iterate over parameters that have an average
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f32)> + '_ {
        Parameter::ALL
            .iter()
            .filter_map(move |&p| self.get(p).map(|avg| (p, avg)))
    }

    /// Check if no parameter has any samples
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    #[cfg(test)]
    pub(crate) fn for_test(entries: &[(Parameter, f32)]) -> Self {
        let mut averages = Self::default();
        for &(p, v) in entries {
            averages.values[p.index()] = Some(v);
        }
        averages
    }
}

/// One [`Window`] per parameter, refilled from the store each check cycle
pub struct RollingAggregator {
    windows: [Window; PARAM_COUNT],
}

impl RollingAggregator {
    /// Create empty windows, each with effective capacity `window`
    pub fn new(window: usize) -> Self {
        Self {
            windows: core::array::from_fn(|_| Window::new(window)),
        }
    }

    /// Push one value for one parameter
    pub fn push(&mut self, parameter: Parameter, value: f32) {
        self.windows[parameter.index()].push(value);
    }

    /// Push every channel of a decoded reading
    pub fn ingest(&mut self, reading: &Reading) {
        for (parameter, value) in reading.iter() {
            self.push(parameter, value);
        }
    }

    /// Empty all windows
    ///
    /// Called at the top of each check cycle before refilling from the
    /// store, so a cycle only ever sees what the store currently holds.
    pub fn clear(&mut self) {
        for window in self.windows.iter_mut() {
            window.clear();
        }
    }

    /// Samples currently held for one parameter
    pub fn len(&self, parameter: Parameter) -> usize {
        self.windows[parameter.index()].len()
    }

    /// Check if every window is empty
    pub fn is_empty(&self) -> bool {
        self.windows.iter().all(Window::is_empty)
    }

    /// Snapshot the current means
    pub fn averages(&self) -> Averages {
        let mut averages = Averages::default();
        for (window, slot) in self.windows.iter().zip(averages.values.iter_mut()) {
            *slot = window.mean();
        }
        averages
    }
}

#[cfg(feature = "std")]
impl RollingAggregator {
    /// Clear and refill every window from rows read back from the store
    ///
    /// Rows are expected oldest-first, the order [`crate::store`] returns
    /// them in; fields that failed to parse are simply absent and leave
    /// the corresponding window untouched for that row.
    pub fn refill(&mut self, rows: &[crate::store::RecentRow]) {
        self.clear();
        for row in rows {
            for (parameter, value) in row.iter() {
                self.push(parameter, value);
            }
        }
    }
}
