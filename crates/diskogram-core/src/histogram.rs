//! Time-bucketed histogram of file sizes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::bucket::TimeBucket;
use crate::error::{HistogramError, ScanWarning};
use crate::interval::Interval;
use crate::sink::ErrorSink;

/// Bucket slots reserved on the first insertion.
pub const INITIAL_BUCKET_CAPACITY: usize = 128;

/// Maximum length in bytes of [`Histogram::last_error`].
pub const MAX_ERROR_LEN: usize = 255;

/// Lifecycle of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistogramState {
    /// No file observed yet.
    Empty,
    /// At least one file observed, buckets in insertion order.
    Accumulating,
    /// Buckets sorted by start time; read-only from here on.
    Finalized,
}

/// Aggregates file observations into time buckets.
///
/// Buckets live in a vector in first-seen order and are located through a
/// key-to-index map, so a bucket's identity is its index and survives
/// growth of the vector. [`Histogram::finalize`] sorts the buckets by start
/// time; presentation code must only read a finalized histogram.
///
/// Inserting after finalization keeps the totals right but leaves the new
/// buckets unsorted at the tail. That is a usage error and is not checked.
pub struct Histogram {
    interval: Interval,
    buckets: Vec<TimeBucket>,
    index: HashMap<i64, usize>,
    total_bytes: u64,
    total_files: u64,
    directories_scanned: u64,
    error_count: u64,
    last_error: Option<String>,
    started_at: DateTime<Local>,
    finished_at: Option<DateTime<Local>>,
    finalized: bool,
    sink: Option<Arc<dyn ErrorSink>>,
}

impl Histogram {
    /// Create an empty histogram with a fixed interval.
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            buckets: Vec::new(),
            index: HashMap::new(),
            total_bytes: 0,
            total_files: 0,
            directories_scanned: 0,
            error_count: 0,
            last_error: None,
            started_at: Local::now(),
            finished_at: None,
            finalized: false,
            sink: None,
        }
    }

    /// Create an empty histogram that forwards absorbed errors to `sink`.
    pub fn with_sink(interval: Interval, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::new(interval)
        }
    }

    /// Record one file of `size` bytes with the given timestamp.
    ///
    /// If bucket storage cannot grow, the observation is dropped, the
    /// histogram is left unchanged and the error is returned for the caller
    /// to record.
    pub fn add_file(&mut self, timestamp: i64, size: u64) -> Result<(), HistogramError> {
        let key = self.interval.normalize(timestamp);

        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].record(size),
            None => {
                self.reserve_bucket()?;
                self.index.insert(key, self.buckets.len());
                self.buckets.push(TimeBucket::new(key, size));
            }
        }

        self.total_bytes = self.total_bytes.saturating_add(size);
        self.total_files = self.total_files.saturating_add(1);

        debug_assert!(self.totals_consistent(), "bucket sums diverged from totals");
        Ok(())
    }

    /// Sort buckets by ascending start time. Calling it again is a no-op.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.buckets.sort_by_key(|bucket| bucket.start_time);
        self.index = self
            .buckets
            .iter()
            .enumerate()
            .map(|(slot, bucket)| (bucket.start_time, slot))
            .collect();
        self.finished_at = Some(Local::now());
        self.finalized = true;
    }

    /// Count one directory successfully opened for listing.
    pub fn record_directory(&mut self) {
        self.directories_scanned += 1;
    }

    /// Absorb one non-fatal scan error.
    pub fn record_warning(&mut self, warning: &ScanWarning) {
        self.error_count += 1;
        self.last_error = Some(truncate_message(&warning.message));
        if let Some(sink) = &self.sink {
            sink.record(warning);
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HistogramState {
        if self.finalized {
            HistogramState::Finalized
        } else if self.buckets.is_empty() {
            HistogramState::Empty
        } else {
            HistogramState::Accumulating
        }
    }

    /// Check whether any file was recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets; ascending by start time once finalized.
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    /// Bucket that `timestamp` falls into, if any file landed there.
    pub fn bucket_for(&self, timestamp: i64) -> Option<&TimeBucket> {
        let key = self.interval.normalize(timestamp);
        self.index.get(&key).map(|&slot| &self.buckets[slot])
    }

    /// Largest per-bucket byte total.
    pub fn max_bucket_bytes(&self) -> u64 {
        self.buckets.iter().map(|b| b.total_bytes).max().unwrap_or(0)
    }

    /// Bucket granularity.
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Total bytes over all buckets.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Total files over all buckets.
    pub fn total_files(&self) -> u64 {
        self.total_files
    }

    /// Directories successfully opened while filling this histogram.
    pub fn directories_scanned(&self) -> u64 {
        self.directories_scanned
    }

    /// Number of absorbed errors.
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Most recent absorbed error, at most [`MAX_ERROR_LEN`] bytes.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Check whether results may be incomplete.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// When the histogram was created.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// When the histogram was first finalized.
    pub fn finished_at(&self) -> Option<DateTime<Local>> {
        self.finished_at
    }

    /// Wall-clock time between creation and finalization.
    pub fn scan_duration(&self) -> Duration {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
            .unwrap_or_default()
    }

    fn reserve_bucket(&mut self) -> Result<(), HistogramError> {
        let len = self.buckets.len();
        let grow = |source| HistogramError::Allocation {
            buckets: len,
            source,
        };
        if len == self.buckets.capacity() {
            // Double on exhaustion.
            let additional = len.max(INITIAL_BUCKET_CAPACITY);
            self.buckets.try_reserve_exact(additional).map_err(grow)?;
        }
        // The vec may have room while the map has none.
        self.index.try_reserve(1).map_err(grow)?;
        Ok(())
    }

    fn totals_consistent(&self) -> bool {
        let bytes = self
            .buckets
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.total_bytes));
        let files = self
            .buckets
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.file_count));
        bytes == self.total_bytes && files == self.total_files
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Histogram")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .field("buckets", &self.buckets.len())
            .field("total_bytes", &self.total_bytes)
            .field("total_files", &self.total_files)
            .field("directories_scanned", &self.directories_scanned)
            .field("error_count", &self.error_count)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_ERROR_LEN {
        return message.to_string();
    }
    let mut end = MAX_ERROR_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}
