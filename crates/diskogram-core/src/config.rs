//! Scan and run configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::interval::Interval;
use crate::mode::TimestampMode;

/// Configuration for a single scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ScanConfig {
    /// Timestamp that assigns files to buckets.
    #[builder(default)]
    #[serde(default)]
    pub timestamp_mode: TimestampMode,

    /// Bucket granularity.
    #[builder(default)]
    #[serde(default)]
    pub interval: Interval,
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config from its two selectors.
    pub fn new(timestamp_mode: TimestampMode, interval: Interval) -> Self {
        Self {
            timestamp_mode,
            interval,
        }
    }
}

/// Output format of a run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal bar chart.
    #[default]
    Text,
    /// Comma-separated values.
    Csv,
    /// JSON document.
    Json,
    /// XML document.
    Xml,
}

/// Everything one invocation needs besides the scan selectors.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RunConfig {
    /// Roots to scan, in input order.
    pub roots: Vec<PathBuf>,

    /// Roots were read from standard input.
    #[builder(default = "false")]
    #[serde(default)]
    pub from_stdin: bool,

    /// One histogram per root instead of one aggregate.
    #[builder(default = "false")]
    #[serde(default)]
    pub batch: bool,

    /// How results are written.
    #[builder(default)]
    #[serde(default)]
    pub format: OutputFormat,

    /// File receiving every absorbed error.
    #[builder(default)]
    #[serde(default)]
    pub error_log: Option<PathBuf>,

    /// Echo every absorbed error to stderr.
    #[builder(default = "false")]
    #[serde(default)]
    pub log_errors_to_stderr: bool,
}

impl RunConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let from_stdin = self.from_stdin.unwrap_or(false);
        let Some(roots) = &self.roots else {
            return Err("Root paths are required".to_string());
        };
        if roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err("Root path cannot be empty".to_string());
        }
        if !from_stdin && roots.len() != 1 {
            return Err("Exactly one directory must be given".to_string());
        }
        if self.batch.unwrap_or(false) && !from_stdin {
            return Err("--batch requires --stdin".to_string());
        }
        Ok(())
    }
}

impl RunConfig {
    /// Create a new run config builder.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Whether roots are aggregated into one histogram.
    pub fn is_aggregate(&self) -> bool {
        self.from_stdin && !self.batch
    }
}
