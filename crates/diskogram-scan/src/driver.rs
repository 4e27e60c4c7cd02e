//! Multi-root scan drivers.
//!
//! Aggregate mode feeds every root into one histogram, serially. Batch mode
//! gives each root its own histogram and scans the roots on the rayon pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use diskogram_core::{ErrorSink, Histogram, ScanError};

use crate::scanner::{ScanSummary, Scanner};

/// Result of scanning several roots into one histogram.
#[derive(Debug)]
pub struct AggregateScan {
    /// Finalized histogram covering every reachable root.
    pub histogram: Histogram,
    /// Combined contribution of the reachable roots.
    pub summary: ScanSummary,
    /// Roots that could not be opened, in input order.
    pub failures: Vec<ScanError>,
    /// Number of roots attempted.
    pub roots: usize,
}

impl AggregateScan {
    /// Whether every root could be opened.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of scanning one root in batch mode.
#[derive(Debug)]
pub struct RootScan {
    /// Root as given.
    pub root: PathBuf,
    /// Finalized histogram; empty if the root could not be opened.
    pub histogram: Histogram,
    /// Summary, or the reason the root was unreachable.
    pub outcome: Result<ScanSummary, ScanError>,
}

impl RootScan {
    /// Whether the root could be opened.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Scan `roots` one after another into a single histogram.
///
/// `on_root` is called before each root is scanned. An unreachable root is
/// collected in [`AggregateScan::failures`] and the remaining roots are
/// still scanned.
pub fn scan_aggregate<P, F>(
    scanner: &Scanner,
    roots: &[P],
    sink: Option<Arc<dyn ErrorSink>>,
    mut on_root: F,
) -> AggregateScan
where
    P: AsRef<Path>,
    F: FnMut(&Path),
{
    let mut histogram = scanner.new_histogram(sink);
    let mut summary = ScanSummary::default();
    let mut failures = Vec::new();

    for root in roots {
        let root = root.as_ref();
        on_root(root);
        match scanner.scan(root, &mut histogram) {
            Ok(contribution) => summary += contribution,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "root skipped");
                failures.push(err);
            }
        }
    }

    histogram.finalize();
    info!(
        roots = roots.len(),
        failed = failures.len(),
        buckets = histogram.buckets().len(),
        "aggregate scan finished"
    );

    AggregateScan {
        histogram,
        summary,
        failures,
        roots: roots.len(),
    }
}

/// Scan each root into its own histogram, in parallel.
///
/// Results come back in the order of `roots`. The sink is shared by every
/// histogram and must synchronize internally.
pub fn scan_batch<P>(
    scanner: &Scanner,
    roots: &[P],
    sink: Option<Arc<dyn ErrorSink>>,
) -> Vec<RootScan>
where
    P: AsRef<Path> + Sync,
{
    let results: Vec<RootScan> = roots
        .par_iter()
        .map(|root| {
            let root = root.as_ref();
            let mut histogram = scanner.new_histogram(sink.clone());
            let outcome = scanner.scan(root, &mut histogram);
            if let Err(err) = &outcome {
                warn!(root = %root.display(), error = %err, "root skipped");
            }
            histogram.finalize();
            RootScan {
                root: root.to_path_buf(),
                histogram,
                outcome,
            }
        })
        .collect();

    info!(
        roots = results.len(),
        failed = results.iter().filter(|scan| !scan.is_ok()).count(),
        "batch scan finished"
    );
    results
}
