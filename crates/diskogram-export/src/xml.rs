//! XML output.
//!
//! The document shape is small and fixed, so it is written directly rather
//! than through a serializer.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::report::HistogramReport;
use crate::{BatchItem, ExportResult};
use diskogram_core::Histogram;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub(crate) fn write_xml<W: Write>(out: &mut W, histogram: &Histogram, title: &str) -> ExportResult<()> {
    writeln!(out, "{DECLARATION}")?;
    write_histogram(out, &HistogramReport::new(histogram, title), 0)?;
    Ok(())
}

/// Write a `<histograms>` collection of every non-empty histogram.
pub(crate) fn write_xml_batch<W: Write>(out: &mut W, items: &[BatchItem<'_>]) -> ExportResult<()> {
    writeln!(out, "{DECLARATION}")?;
    writeln!(out, "<histograms>")?;
    for item in items.iter().filter(|item| !item.histogram.is_empty()) {
        write_histogram(out, &HistogramReport::new(item.histogram, item.title), 1)?;
    }
    writeln!(out, "</histograms>")?;
    Ok(())
}

fn write_histogram<W: Write>(out: &mut W, report: &HistogramReport<'_>, depth: usize) -> io::Result<()> {
    let pad = "  ".repeat(depth);
    let interval: &'static str = report.interval.into();
    let field = |out: &mut W, name: &str, value: &str| {
        writeln!(out, "{pad}  <{name}>{}</{name}>", escape(value))
    };

    writeln!(out, "{pad}<histogram>")?;
    field(out, "version", report.version)?;
    field(out, "title", report.title)?;
    field(out, "total_bytes", &report.total_bytes.to_string())?;
    field(out, "total_files", &report.total_files.to_string())?;
    field(out, "interval", interval)?;
    field(out, "scan_start", &report.scan_start)?;
    field(out, "scan_end", &report.scan_end)?;
    field(out, "scan_duration_seconds", &report.scan_duration_seconds.to_string())?;
    field(out, "directories_scanned", &report.directories_scanned.to_string())?;
    field(out, "error_count", &report.error_count.to_string())?;
    if let Some(last) = report.last_error {
        field(out, "last_error", last)?;
    }

    writeln!(out, "{pad}  <buckets>")?;
    for bucket in &report.buckets {
        writeln!(out, "{pad}    <bucket>")?;
        writeln!(out, "{pad}      <time>{}</time>", escape(&bucket.time))?;
        writeln!(out, "{pad}      <bytes>{}</bytes>", bucket.bytes)?;
        writeln!(out, "{pad}      <files>{}</files>", bucket.files)?;
        writeln!(out, "{pad}    </bucket>")?;
    }
    writeln!(out, "{pad}  </buckets>")?;
    writeln!(out, "{pad}</histogram>")
}

/// Escape the five XML special characters.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain/path"), "plain/path");
        assert_eq!(
            escape(r#"<a & 'b' "c">"#),
            "&lt;a &amp; &apos;b&apos; &quot;c&quot;&gt;"
        );
    }
}
