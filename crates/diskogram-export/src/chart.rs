//! Terminal bar chart.

use std::io::{self, Write};

use diskogram_core::Histogram;

/// Width in cells of the longest bar.
pub const BAR_WIDTH: usize = 50;

const BAR_CELL: &str = "█";

/// Format a byte count with binary units.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Bar length for a bucket of `bytes` against the largest bucket `max`.
///
/// Scales linearly to [`BAR_WIDTH`], rounding down, but a non-empty bucket
/// always gets at least one cell.
pub fn bar_length(bytes: u64, max: u64) -> usize {
    if max == 0 {
        return 0;
    }
    let len = (bytes as f64 / max as f64 * BAR_WIDTH as f64) as usize;
    if len == 0 && bytes > 0 { 1 } else { len.min(BAR_WIDTH) }
}

/// Write the scan error warning for `histogram`, if it absorbed any errors.
pub fn write_error_warning<W: Write>(out: &mut W, histogram: &Histogram) -> io::Result<()> {
    if !histogram.has_errors() {
        return Ok(());
    }
    writeln!(
        out,
        "WARNING: {} error(s) occurred during scan",
        histogram.error_count()
    )?;
    if let Some(last) = histogram.last_error().filter(|m| !m.is_empty()) {
        writeln!(out, "Last error: {last}")?;
    }
    writeln!(out, "Results may be incomplete.")
}

/// Render `histogram` as a bar chart, one row per bucket.
///
/// An empty histogram still shows its totals and error warning when the scan
/// absorbed errors.
pub fn write_chart<W: Write>(out: &mut W, histogram: &Histogram, title: &str) -> io::Result<()> {
    if histogram.is_empty() && !histogram.has_errors() {
        return writeln!(out, "No data to display.");
    }

    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(
        out,
        "Total: {} in {} files ({} directories scanned)",
        format_size(histogram.total_bytes()),
        histogram.total_files(),
        histogram.directories_scanned()
    )?;

    if histogram.has_errors() {
        writeln!(out)?;
        write_error_warning(out, histogram)?;
    }
    writeln!(out)?;

    let max = histogram.max_bucket_bytes();
    if max == 0 {
        return writeln!(out, "No data to display.");
    }

    let interval = histogram.interval();
    for bucket in histogram.buckets() {
        let bar = BAR_CELL.repeat(bar_length(bucket.total_bytes, max));
        writeln!(
            out,
            "{}  {}  {} ({} files)",
            interval.label(bucket.start_time),
            bar,
            format_size(bucket.total_bytes),
            bucket.file_count
        )?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diskogram_core::{Interval, ScanWarning, WarningKind};

    fn render(histogram: &Histogram) -> String {
        let mut out = Vec::new();
        write_chart(&mut out, histogram, "Disk Space by Modification Time: /data").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bar_length() {
        assert_eq!(bar_length(100, 100), BAR_WIDTH);
        assert_eq!(bar_length(50, 100), 25);
        assert_eq!(bar_length(1, 1_000_000), 1);
        assert_eq!(bar_length(0, 100), 0);
        assert_eq!(bar_length(0, 0), 0);
    }

    #[test]
    fn test_empty_histogram() {
        let hist = Histogram::new(Interval::Day);
        assert_eq!(render(&hist), "No data to display.\n");
    }

    #[test]
    fn test_empty_histogram_with_errors_still_warns() {
        let mut hist = Histogram::new(Interval::Day);
        hist.record_directory();
        hist.record_warning(&ScanWarning::new(
            "/data/locked",
            "cannot open directory '/data/locked': Permission denied",
            WarningKind::ReadDir,
        ));
        hist.finalize();

        let text = render(&hist);
        assert!(text.contains(&format!(
            "Total: {} in 0 files (1 directories scanned)",
            format_size(0)
        )));
        assert!(text.contains("WARNING: 1 error(s) occurred during scan"));
        assert!(text.contains("Last error: cannot open directory '/data/locked'"));
        assert!(text.ends_with("Results may be incomplete.\n\nNo data to display.\n"));
    }

    #[test]
    fn test_warning_without_errors_is_silent() {
        let hist = Histogram::new(Interval::Day);
        let mut out = Vec::new();
        write_error_warning(&mut out, &hist).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_rows_and_totals() {
        let mut hist = Histogram::new(Interval::Day);
        hist.add_file(86_400 * 19_000, 2048).unwrap();
        hist.add_file(86_400 * 19_001, 1024).unwrap();
        hist.record_directory();
        hist.finalize();

        let text = render(&hist);
        assert!(text.contains("Disk Space by Modification Time: /data"));
        assert!(text.contains(&format!("Total: {} in 2 files (1 directories scanned)", format_size(3072))));
        assert!(!text.contains("WARNING"));

        let rows: Vec<&str> = text.lines().filter(|l| l.contains(BAR_CELL)).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with(&Interval::Day.label(86_400 * 19_000)));
        assert!(rows[0].contains(&BAR_CELL.repeat(BAR_WIDTH)));
        assert!(rows[1].contains(&format!(" {}  ", BAR_CELL.repeat(25))));
        assert!(rows[1].ends_with("(1 files)"));
    }

    #[test]
    fn test_error_warning_block() {
        let mut hist = Histogram::new(Interval::Year);
        hist.add_file(1_600_000_000, 1).unwrap();
        hist.record_warning(&ScanWarning::new(
            "/srv/locked",
            "cannot open directory '/srv/locked': Permission denied",
            WarningKind::ReadDir,
        ));
        hist.finalize();

        let text = render(&hist);
        assert!(text.contains("WARNING: 1 error(s) occurred during scan"));
        assert!(text.contains("Last error: cannot open directory '/srv/locked'"));
        assert!(text.contains("Results may be incomplete."));
    }
}
