//! JSON output.

use std::io::Write;

use crate::report::HistogramReport;
use crate::{BatchItem, ExportResult};
use diskogram_core::Histogram;

pub(crate) fn write_json<W: Write>(out: &mut W, histogram: &Histogram, title: &str) -> ExportResult<()> {
    serde_json::to_writer_pretty(&mut *out, &HistogramReport::new(histogram, title))?;
    writeln!(out)?;
    Ok(())
}

/// Write a JSON array with one report per non-empty histogram.
pub(crate) fn write_json_batch<W: Write>(out: &mut W, items: &[BatchItem<'_>]) -> ExportResult<()> {
    let reports: Vec<HistogramReport<'_>> = items
        .iter()
        .filter(|item| !item.histogram.is_empty())
        .map(|item| HistogramReport::new(item.histogram, item.title))
        .collect();
    serde_json::to_writer_pretty(&mut *out, &reports)?;
    writeln!(out)?;
    Ok(())
}
