//! Core types for diskogram.
//!
//! This crate provides the data structures shared by the scanner and the
//! exporters: time intervals and their normalization, timestamp selection
//! modes, the bucketing [`Histogram`], error and warning types, the injected
//! [`ErrorSink`] capability, and configuration.

mod bucket;
mod config;
mod error;
mod histogram;
mod interval;
mod mode;
mod sink;

pub use bucket::TimeBucket;
pub use config::{
    OutputFormat, RunConfig, RunConfigBuilder, RunConfigBuilderError, ScanConfig,
    ScanConfigBuilder, ScanConfigBuilderError,
};
pub use error::{HistogramError, ScanError, ScanWarning, WarningKind};
pub use histogram::{Histogram, HistogramState, INITIAL_BUCKET_CAPACITY, MAX_ERROR_LEN};
pub use interval::{Interval, epoch_seconds};
pub use mode::TimestampMode;
pub use sink::{ErrorLog, ErrorSink};
