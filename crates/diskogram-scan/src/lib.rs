//! Directory traversal engine for diskogram.
//!
//! This crate walks directory trees and feeds every regular file's size and
//! selected timestamp into a [`Histogram`].
//!
//! # Overview
//!
//! - **Depth-first, serial** traversal of one root per [`Scanner::scan`] call
//! - **Symbolic links never followed**, so cycles cannot occur
//! - **Absorbed errors**: unreadable entries are counted on the histogram
//!   and reported to its sink, only an unreachable root fails
//! - **Aggregate and batch** drivers for several roots
//!
//! # Example
//!
//! ```rust,no_run
//! use diskogram_scan::{Interval, ScanConfig, Scanner, TimestampMode};
//!
//! let scanner = Scanner::new(ScanConfig::new(TimestampMode::Modified, Interval::Month));
//! let mut histogram = scanner.new_histogram(None);
//! scanner.scan("/var/log", &mut histogram).unwrap();
//! histogram.finalize();
//!
//! for bucket in histogram.buckets() {
//!     println!("{}: {} bytes", Interval::Month.label(bucket.start_time), bucket.total_bytes);
//! }
//! ```

mod driver;
mod metadata;
mod scanner;

pub use driver::{AggregateScan, RootScan, scan_aggregate, scan_batch};
pub use scanner::{ScanSummary, Scanner};

// Re-export core types for convenience
pub use diskogram_core::{
    ErrorLog, ErrorSink, Histogram, HistogramState, Interval, ScanConfig, ScanError, ScanWarning,
    TimestampMode, WarningKind,
};
