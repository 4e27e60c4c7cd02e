//! Error types for scanning and aggregation.

use std::collections::TryReserveError;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a scan of one root.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for the root path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// The root path the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::NotADirectory { path }
            | Self::Io { path, .. } => path,
        }
    }
}

/// Errors raised while inserting into a histogram.
#[derive(Debug, Error)]
pub enum HistogramError {
    /// Growing the bucket storage failed; the observation was dropped.
    #[error("out of memory growing bucket storage beyond {buckets} buckets")]
    Allocation {
        buckets: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Kind of absorbed scan error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A nested directory could not be opened; its subtree was skipped.
    ReadDir,
    /// Metadata for one entry could not be read; the entry was skipped.
    Metadata,
    /// Bucket storage could not grow; one file observation was dropped.
    Allocation,
}

/// Non-fatal error encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message, including the path.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// A directory that could not be opened for listing.
    pub fn read_dir(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("cannot open directory '{}': {error}", path.display()),
            path,
            kind: WarningKind::ReadDir,
        }
    }

    /// An entry whose metadata could not be read.
    pub fn metadata(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("cannot stat '{}': {error}", path.display()),
            path,
            kind: WarningKind::Metadata,
        }
    }

    /// A file observation dropped because bucket storage could not grow.
    pub fn allocation(path: impl Into<PathBuf>, error: &HistogramError) -> Self {
        let path = path.into();
        Self {
            message: format!("dropped '{}': {error}", path.display()),
            path,
            kind: WarningKind::Allocation,
        }
    }
}
