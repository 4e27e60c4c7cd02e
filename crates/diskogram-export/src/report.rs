//! Serializable view of a histogram shared by the structured formats.

use chrono::{DateTime, Local};
use serde::Serialize;

use diskogram_core::{Histogram, Interval};

/// Version stamped into every export.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SCAN_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One bucket as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRow {
    /// Bucket label for the histogram's interval.
    pub time: String,
    pub bytes: u64,
    pub files: u64,
}

/// Export document for one histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramReport<'a> {
    pub version: &'static str,
    pub title: &'a str,
    pub total_bytes: u64,
    pub total_files: u64,
    pub interval: Interval,
    pub scan_start: String,
    pub scan_end: String,
    pub scan_duration_seconds: u64,
    pub directories_scanned: u64,
    pub error_count: u64,
    /// Present only when errors were absorbed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<&'a str>,
    pub buckets: Vec<BucketRow>,
}

impl<'a> HistogramReport<'a> {
    /// Build the report of a finalized histogram.
    pub fn new(histogram: &'a Histogram, title: &'a str) -> Self {
        let interval = histogram.interval();
        let last_error = if histogram.has_errors() {
            histogram.last_error().filter(|message| !message.is_empty())
        } else {
            None
        };

        Self {
            version: VERSION,
            title,
            total_bytes: histogram.total_bytes(),
            total_files: histogram.total_files(),
            interval,
            scan_start: scan_time(Some(histogram.started_at())),
            scan_end: scan_time(histogram.finished_at()),
            scan_duration_seconds: histogram.scan_duration().as_secs(),
            directories_scanned: histogram.directories_scanned(),
            error_count: histogram.error_count(),
            last_error,
            buckets: histogram
                .buckets()
                .iter()
                .map(|bucket| BucketRow {
                    time: interval.label(bucket.start_time),
                    bytes: bucket.total_bytes,
                    files: bucket.file_count,
                })
                .collect(),
        }
    }
}

fn scan_time(at: Option<DateTime<Local>>) -> String {
    match at {
        Some(at) => at.format(SCAN_TIME_FORMAT).to_string(),
        None => "unknown".to_string(),
    }
}
