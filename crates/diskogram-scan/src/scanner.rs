//! Depth-first directory scanner.

use std::fs::Metadata;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};
use walkdir::WalkDir;

use diskogram_core::{ErrorSink, Histogram, ScanConfig, ScanError, ScanWarning};

use crate::metadata::{EntryClass, select_timestamp};

/// What one call to [`Scanner::scan`] contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Directories opened, root included.
    pub directories_scanned: u64,
    /// Regular files recorded in the histogram.
    pub files_recorded: u64,
    /// Bytes recorded in the histogram.
    pub bytes_recorded: u64,
    /// Symbolic links and reparse points skipped.
    pub links_skipped: u64,
    /// Errors absorbed into the histogram.
    pub errors: u64,
    /// Time spent walking.
    pub elapsed: Duration,
}

impl AddAssign for ScanSummary {
    fn add_assign(&mut self, other: Self) {
        self.directories_scanned += other.directories_scanned;
        self.files_recorded += other.files_recorded;
        self.bytes_recorded = self.bytes_recorded.saturating_add(other.bytes_recorded);
        self.links_skipped += other.links_skipped;
        self.errors += other.errors;
        self.elapsed += other.elapsed;
    }
}

/// Walks directory trees and reports regular files to a [`Histogram`].
///
/// Each scan is single-threaded and depth-first. Symbolic links and reparse
/// points are never followed, so directory cycles cannot occur.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Configuration of this scanner.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Create an empty histogram matching this scanner's interval.
    pub fn new_histogram(&self, sink: Option<Arc<dyn ErrorSink>>) -> Histogram {
        match sink {
            Some(sink) => Histogram::with_sink(self.config.interval, sink),
            None => Histogram::new(self.config.interval),
        }
    }

    /// Scan `root` into `histogram`.
    ///
    /// Only a root that cannot be opened fails the call, and then the
    /// histogram is left untouched. Every other failure is recorded on the
    /// histogram and the walk continues with the next entry.
    pub fn scan(
        &self,
        root: impl AsRef<Path>,
        histogram: &mut Histogram,
    ) -> Result<ScanSummary, ScanError> {
        let root = root.as_ref();
        let start = Instant::now();

        info!(
            root = %root.display(),
            mode = %self.config.timestamp_mode,
            interval = %self.config.interval,
            "scan started"
        );

        let mut walker = WalkDir::new(root).follow_links(false).into_iter();
        let mut walk = Walk {
            scanner: self,
            histogram,
            summary: ScanSummary::default(),
            listing: None,
        };

        while let Some(item) = walker.next() {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    // Nothing is recorded until the root listing succeeds.
                    if err.depth() == 0 && walk.summary.directories_scanned == 0 {
                        return Err(ScanError::io(root, into_io_error(err)));
                    }
                    let path = err.path().unwrap_or(root).to_path_buf();
                    walk.failed(path, into_io_error(err));
                    continue;
                }
            };
            walk.open_listing();

            if entry.depth() == 0 {
                if !entry.file_type().is_dir() {
                    return Err(ScanError::NotADirectory {
                        path: root.to_path_buf(),
                    });
                }
                walk.listing = Some(entry.into_path());
                continue;
            }

            // With follow_links(false) this does not traverse symlinks.
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    let path = entry.into_path();
                    walk.absorb(ScanWarning::metadata(&path, &into_io_error(err)));
                    continue;
                }
            };

            match EntryClass::of(&metadata) {
                EntryClass::Directory => walk.listing = Some(entry.into_path()),
                EntryClass::File => walk.record_file(entry.path(), &metadata),
                EntryClass::Link => {
                    trace!(path = %entry.path().display(), "skipping link");
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    walk.summary.links_skipped += 1;
                }
                EntryClass::Other => trace!(path = %entry.path().display(), "skipping special file"),
            }
        }
        walk.open_listing();

        let mut summary = walk.summary;
        summary.elapsed = start.elapsed();

        info!(
            root = %root.display(),
            directories = summary.directories_scanned,
            files = summary.files_recorded,
            bytes = summary.bytes_recorded,
            errors = summary.errors,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "scan finished"
        );

        Ok(summary)
    }
}

/// Take the underlying I/O error; loops cannot occur without following links.
fn into_io_error(err: walkdir::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error().unwrap_or_else(|| io::Error::other(message))
}

/// State of one walk.
struct Walk<'a> {
    scanner: &'a Scanner,
    histogram: &'a mut Histogram,
    summary: ScanSummary,
    /// Directory just yielded by the walker. Its listing failure, if any,
    /// is the very next item, so it is counted only once that has passed.
    listing: Option<PathBuf>,
}

impl Walk<'_> {
    /// Count the pending directory as scanned.
    fn open_listing(&mut self) {
        if self.listing.take().is_some() {
            self.histogram.record_directory();
            self.summary.directories_scanned += 1;
        }
    }

    /// Absorb a walker error for `path`.
    fn failed(&mut self, path: PathBuf, err: io::Error) {
        if self.listing.as_deref() == Some(path.as_path()) {
            self.listing = None;
            self.absorb(ScanWarning::read_dir(path, &err));
        } else {
            self.open_listing();
            self.absorb(ScanWarning::metadata(path, &err));
        }
    }

    fn record_file(&mut self, path: &Path, metadata: &Metadata) {
        let timestamp = match select_timestamp(metadata, self.scanner.config.timestamp_mode) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                self.absorb(ScanWarning::metadata(path, &err));
                return;
            }
        };

        let size = metadata.len();
        match self.histogram.add_file(timestamp, size) {
            Ok(()) => {
                self.summary.files_recorded += 1;
                self.summary.bytes_recorded = self.summary.bytes_recorded.saturating_add(size);
            }
            Err(err) => self.absorb(ScanWarning::allocation(path, &err)),
        }
    }

    fn absorb(&mut self, warning: ScanWarning) {
        debug!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
        self.summary.errors += 1;
        self.histogram.record_warning(&warning);
    }
}
