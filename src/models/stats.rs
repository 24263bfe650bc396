//! Run statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters collected over one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub states_total: usize,
    pub states_completed: usize,
    pub states_failed: usize,
    pub candidates_found: usize,
    pub records: usize,
    pub detail_failures: usize,
    pub cancelled: bool,
}

impl RunStats {
    /// Fresh counters starting now.
    pub fn start(states_total: usize) -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            states_total,
            states_completed: 0,
            states_failed: 0,
            candidates_found: 0,
            records: 0,
            detail_failures: 0,
            cancelled: false,
        }
    }

    /// Stamp the end time.
    pub fn finish(&mut self) {
        self.end_time = Utc::now();
    }

    /// Wall-clock duration in seconds.
    pub fn elapsed_secs(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }
}
