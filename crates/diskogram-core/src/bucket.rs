//! Time bucket type.

use serde::{Deserialize, Serialize};

/// Files whose timestamp falls into one discretized interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Canonical start of the interval, in epoch seconds.
    pub start_time: i64,
    /// Sum of the sizes of the files in this bucket.
    pub total_bytes: u64,
    /// Number of files in this bucket.
    pub file_count: u64,
}

impl TimeBucket {
    /// Create a bucket holding a single file.
    pub fn new(start_time: i64, size: u64) -> Self {
        Self {
            start_time,
            total_bytes: size,
            file_count: 1,
        }
    }

    /// Add one file to this bucket.
    pub fn record(&mut self, size: u64) {
        self.total_bytes = self.total_bytes.saturating_add(size);
        self.file_count = self.file_count.saturating_add(1);
    }
}
