//! Sliding match-count window
//!
//! Log-pattern thresholds are defined over a time window, not over a single
//! cycle, so each monitored log source keeps a rolling buffer of timestamped
//! match counts. The buffer persists across cycles; only entries that age
//! out of the window are discarded.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

/// Rolling buffer of timestamped match counts
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    samples: VecDeque<Sample>,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: SystemTime,
    count: u64,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this cycle's match count
    ///
    /// Zero counts are not stored; they contribute nothing to any future
    /// sum and would only grow the buffer.
    pub fn record(&mut self, at: SystemTime, count: u64) {
        if count > 0 {
            self.samples.push_back(Sample { at, count });
        }
    }

    /// Discard samples older than `window` relative to `now`
    ///
    /// A sample exactly `window` old is still inside the window.
    pub fn prune(&mut self, now: SystemTime, window: Duration) {
        self.samples.retain(|s| match now.duration_since(s.at) {
            Ok(age) => age <= window,
            // Sample from the future (clock adjustment); keep it
            Err(_) => true,
        });
    }

    /// Sum of all retained match counts
    pub fn total(&self) -> u64 {
        self.samples.iter().map(|s| s.count).sum()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
