//! CSV output.

use std::io::Write;

use crate::chart::format_size;
use crate::report::VERSION;
use crate::{BatchItem, ExportResult};
use diskogram_core::Histogram;

const HEADER: [&str; 4] = ["Time", "Bytes", "Files", "Human-Readable Size"];
const BATCH_HEADER: [&str; 5] = ["Path", "Time", "Bytes", "Files", "Human-Readable Size"];

/// Write `#` comment lines describing the scan, then one row per bucket.
pub(crate) fn write_csv<W: Write>(out: &mut W, histogram: &Histogram, title: &str) -> ExportResult<()> {
    writeln!(out, "# {title}")?;
    writeln!(out, "# Version: {VERSION}")?;
    writeln!(out, "# Scan Duration: {} seconds", histogram.scan_duration().as_secs())?;
    writeln!(out, "# Directories Scanned: {}", histogram.directories_scanned())?;
    writeln!(out, "# Errors: {}", histogram.error_count())?;
    if let Some(last) = histogram.last_error().filter(|_| histogram.has_errors()) {
        writeln!(out, "# Last Error: {last}")?;
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    let interval = histogram.interval();
    for bucket in histogram.buckets() {
        writer.write_record([
            interval.label(bucket.start_time),
            bucket.total_bytes.to_string(),
            bucket.file_count.to_string(),
            format_size(bucket.total_bytes),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one table covering every non-empty histogram, keyed by path.
pub(crate) fn write_csv_batch<W: Write>(out: &mut W, items: &[BatchItem<'_>]) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(BATCH_HEADER)?;

    for item in items.iter().filter(|item| !item.histogram.is_empty()) {
        let path = item.path.display().to_string();
        let interval = item.histogram.interval();
        for bucket in item.histogram.buckets() {
            writer.write_record([
                path.clone(),
                interval.label(bucket.start_time),
                bucket.total_bytes.to_string(),
                bucket.file_count.to_string(),
                format_size(bucket.total_bytes),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
