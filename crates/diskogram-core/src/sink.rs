//! Per-error reporting sinks.
//!
//! A sink is handed to each [`Histogram`](crate::Histogram) when it is
//! created. Every absorbed scan error is forwarded to it after the
//! histogram's own counters are updated.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{Local, SecondsFormat};

use crate::error::ScanWarning;

/// Receives every absorbed scan error.
pub trait ErrorSink: Send + Sync {
    /// Record one warning.
    fn record(&self, warning: &ScanWarning);
}

/// Error sink writing to an optional log file and optionally echoing to stderr.
#[derive(Debug, Default)]
pub struct ErrorLog {
    file: Option<Mutex<BufWriter<File>>>,
    echo_stderr: bool,
}

impl ErrorLog {
    /// Create a sink that discards everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log errors to `path`, truncating any existing file.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        self.file = Some(Mutex::new(BufWriter::new(file)));
        Ok(self)
    }

    /// Echo errors to stderr.
    pub fn with_stderr(mut self, enabled: bool) -> Self {
        self.echo_stderr = enabled;
        self
    }

    /// Whether this sink writes anywhere.
    pub fn is_enabled(&self) -> bool {
        self.file.is_some() || self.echo_stderr
    }

    /// Flush the log file, if any.
    pub fn flush(&self) -> io::Result<()> {
        match &self.file {
            Some(file) => file.lock().unwrap_or_else(|e| e.into_inner()).flush(),
            None => Ok(()),
        }
    }
}

impl ErrorSink for ErrorLog {
    fn record(&self, warning: &ScanWarning) {
        if let Some(file) = &self.file {
            let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
            let stamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
            if let Err(err) = writeln!(file, "{stamp} {}", warning.message) {
                tracing::warn!(error = %err, "failed to write error log");
            }
        }
        if self.echo_stderr {
            eprintln!("Error: {}", warning.message);
        }
    }
}
