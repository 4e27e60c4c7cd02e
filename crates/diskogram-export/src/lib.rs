//! Presentation layer for diskogram histograms.
//!
//! Every writer takes a finalized [`Histogram`] and a title and writes to any
//! [`std::io::Write`]. Single-histogram exports refuse empty histograms with
//! [`ExportError::NoData`]; batch exports silently skip them.

mod chart;
mod delimited;
mod json;
mod report;
mod xml;

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use diskogram_core::{Histogram, OutputFormat};

pub use chart::{BAR_WIDTH, bar_length, format_size, write_chart, write_error_warning};
pub use report::{BucketRow, HistogramReport, VERSION};

/// Errors that can occur while writing output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing to the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The histogram holds no buckets.
    #[error("No data to export.")]
    NoData,
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// One entry of a batch export.
#[derive(Debug, Clone, Copy)]
pub struct BatchItem<'a> {
    /// Root the histogram was built from.
    pub path: &'a Path,
    /// Title shown for this root.
    pub title: &'a str,
    /// Finalized histogram of the root.
    pub histogram: &'a Histogram,
}

/// Write one histogram in `format`.
///
/// The text chart handles an empty histogram itself; the other formats
/// return [`ExportError::NoData`] without writing anything.
pub fn export<W: Write>(
    out: &mut W,
    format: OutputFormat,
    histogram: &Histogram,
    title: &str,
) -> ExportResult<()> {
    if format != OutputFormat::Text && histogram.is_empty() {
        return Err(ExportError::NoData);
    }
    tracing::debug!(%format, buckets = histogram.buckets().len(), "exporting histogram");

    match format {
        OutputFormat::Text => write_chart(out, histogram, title)?,
        OutputFormat::Csv => delimited::write_csv(out, histogram, title)?,
        OutputFormat::Json => json::write_json(out, histogram, title)?,
        OutputFormat::Xml => xml::write_xml(out, histogram, title)?,
    }
    Ok(())
}

/// Write several histograms as one document in `format`.
///
/// Text output is one chart per item separated by a blank line. The other
/// formats produce a single collection and leave out empty histograms.
pub fn export_batch<W: Write>(
    out: &mut W,
    format: OutputFormat,
    items: &[BatchItem<'_>],
) -> ExportResult<()> {
    tracing::debug!(%format, items = items.len(), "exporting batch");

    match format {
        OutputFormat::Text => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write_chart(out, item.histogram, item.title)?;
            }
        }
        OutputFormat::Csv => delimited::write_csv_batch(out, items)?,
        OutputFormat::Json => json::write_json_batch(out, items)?,
        OutputFormat::Xml => xml::write_xml_batch(out, items)?,
    }
    Ok(())
}
