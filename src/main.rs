//! diskogram - a histogram of disk usage over time.
//!
//! Usage:
//!   diskogram [OPTIONS] <DIRECTORY>     Scan one directory
//!   find / -type d | diskogram --stdin  Aggregate many roots into one histogram
//!   diskogram --stdin --batch --json    One histogram per root

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use diskogram_core::{
    ErrorLog, ErrorSink, Histogram, Interval, OutputFormat, RunConfig, ScanConfig, TimestampMode,
};
use diskogram_export::{BatchItem, ExportError, export, export_batch, write_error_warning};
use diskogram_scan::{Scanner, scan_aggregate, scan_batch};

#[derive(Parser)]
#[command(
    name = "diskogram",
    version,
    about = "Show where disk space went over time",
    long_about = "diskogram walks a directory tree and groups file sizes into time buckets \
                  by modification, change or access time, then draws a bar chart or \
                  exports the histogram as CSV, JSON or XML.\n\n\
                  Use --stdin to read directories one per line, aggregated into a single \
                  histogram, or add --batch for one histogram per directory."
)]
#[command(args_override_self = true)]
struct Cli {
    /// Directory to scan
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    path: Option<PathBuf>,

    /// Group by modification time (default)
    #[arg(short = 'm', long, overrides_with_all = ["ctime", "atime"])]
    mtime: bool,

    #[arg(
        short = 'c',
        long,
        help = TimestampMode::Changed.description(),
        overrides_with_all = ["mtime", "atime"]
    )]
    ctime: bool,

    /// Group by access time
    #[arg(short = 'a', long, overrides_with_all = ["mtime", "ctime"])]
    atime: bool,

    /// Group by hour
    #[arg(long, overrides_with_all = ["day", "month", "year"])]
    hour: bool,

    /// Group by day (default)
    #[arg(long, overrides_with_all = ["hour", "month", "year"])]
    day: bool,

    /// Group by month
    #[arg(long, overrides_with_all = ["hour", "day", "year"])]
    month: bool,

    /// Group by year
    #[arg(long, overrides_with_all = ["hour", "day", "month"])]
    year: bool,

    /// Export as CSV
    #[arg(long, overrides_with_all = ["json", "xml"])]
    csv: bool,

    /// Export as JSON
    #[arg(long, overrides_with_all = ["csv", "xml"])]
    json: bool,

    /// Export as XML
    #[arg(long, overrides_with_all = ["csv", "json"])]
    xml: bool,

    /// Write every scan error to FILE
    #[arg(long, value_name = "FILE")]
    error_log: Option<PathBuf>,

    /// Print every scan error to stderr
    #[arg(long)]
    log_errors_stderr: bool,

    /// Read directory paths from stdin, one per line
    #[arg(long)]
    stdin: bool,

    /// Output a separate histogram for each path (requires --stdin)
    #[arg(long, requires = "stdin")]
    batch: bool,
}

impl Cli {
    fn timestamp_mode(&self) -> TimestampMode {
        if self.ctime {
            TimestampMode::Changed
        } else if self.atime {
            TimestampMode::Accessed
        } else {
            TimestampMode::Modified
        }
    }

    fn interval(&self) -> Interval {
        if self.hour {
            Interval::Hour
        } else if self.month {
            Interval::Month
        } else if self.year {
            Interval::Year
        } else {
            Interval::Day
        }
    }

    fn format(&self) -> OutputFormat {
        if self.csv {
            OutputFormat::Csv
        } else if self.json {
            OutputFormat::Json
        } else if self.xml {
            OutputFormat::Xml
        } else {
            OutputFormat::Text
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and succeed; usage errors exit 1.
            let code = if err.use_stderr() { 1 } else { 0 };
            err.print()?;
            return Ok(ExitCode::from(code));
        }
    };

    let roots = match &cli.path {
        Some(path) => vec![path.clone()],
        None => read_roots(io::stdin().lock()).context("Failed to read paths from stdin")?,
    };

    let run = RunConfig::builder()
        .roots(roots)
        .from_stdin(cli.stdin)
        .batch(cli.batch)
        .format(cli.format())
        .error_log(cli.error_log.clone())
        .log_errors_to_stderr(cli.log_errors_stderr)
        .build()
        .context("Invalid arguments")?;
    tracing::debug!(?run, "run configured");
    let scanner = Scanner::new(ScanConfig::new(cli.timestamp_mode(), cli.interval()));

    let mut log = ErrorLog::new().with_stderr(run.log_errors_to_stderr);
    if let Some(path) = &run.error_log {
        log = log
            .with_file(path)
            .with_context(|| format!("Cannot open error log file '{}'", path.display()))?;
    }
    let log = Arc::new(log);
    let sink = log
        .is_enabled()
        .then(|| Arc::clone(&log) as Arc<dyn ErrorSink>);

    let complete = if run.batch {
        run_batch(&scanner, &run, sink)?
    } else if run.from_stdin {
        run_aggregate(&scanner, &run, sink)?
    } else {
        run_single(&scanner, &run, sink)?;
        true
    };

    log.flush().context("Failed to write error log")?;

    Ok(if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Read one path per line, skipping blank lines.
fn read_roots(input: impl BufRead) -> io::Result<Vec<PathBuf>> {
    let mut roots = Vec::new();
    for line in input.lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if !line.is_empty() {
            roots.push(PathBuf::from(line));
        }
    }
    Ok(roots)
}

/// Scan the single root given on the command line.
fn run_single(scanner: &Scanner, run: &RunConfig, sink: Option<Arc<dyn ErrorSink>>) -> Result<()> {
    let Some(root) = run.roots.first() else {
        return Ok(());
    };
    announce(run.format, root);

    let mut histogram = scanner.new_histogram(sink);
    scanner
        .scan(root, &mut histogram)
        .context("Failed to scan directory")?;
    histogram.finalize();

    write_single(run.format, &histogram, &title(scanner, &root.display().to_string()))
}

/// Scan every stdin root into one histogram. Returns false if any root failed.
fn run_aggregate(
    scanner: &Scanner,
    run: &RunConfig,
    sink: Option<Arc<dyn ErrorSink>>,
) -> Result<bool> {
    let scan = scan_aggregate(scanner, &run.roots, sink, |root| announce(run.format, root));
    for failure in &scan.failures {
        eprintln!("Error: {failure}");
    }

    let label = format!("{} paths", scan.roots);
    write_single(run.format, &scan.histogram, &title(scanner, &label))?;
    Ok(scan.is_complete())
}

/// Scan every stdin root into its own histogram. Returns false if any root failed.
fn run_batch(scanner: &Scanner, run: &RunConfig, sink: Option<Arc<dyn ErrorSink>>) -> Result<bool> {
    for root in &run.roots {
        announce(run.format, root);
    }

    let results = scan_batch(scanner, &run.roots, sink);
    let mut complete = true;
    for result in &results {
        if let Err(err) = &result.outcome {
            eprintln!("Error: {err}");
            complete = false;
        }
    }

    let titles: Vec<String> = results
        .iter()
        .map(|result| title(scanner, &result.root.display().to_string()))
        .collect();
    let items: Vec<BatchItem<'_>> = results
        .iter()
        .zip(&titles)
        .map(|(result, title)| BatchItem {
            path: &result.root,
            title,
            histogram: &result.histogram,
        })
        .collect();

    let mut out = io::stdout().lock();
    export_batch(&mut out, run.format, &items).context("Failed to write output")?;
    out.flush()?;

    if run.format != OutputFormat::Text {
        let mut err = io::stderr().lock();
        for result in results.iter().filter(|r| r.histogram.is_empty()) {
            report_skipped(&mut err, &result.root, &result.histogram)?;
        }
    }
    Ok(complete)
}

/// Write one histogram to stdout, reporting an empty one on stderr.
fn write_single(format: OutputFormat, histogram: &Histogram, title: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    match export(&mut out, format, histogram, title) {
        Ok(()) => {}
        Err(ExportError::NoData) => report_empty(&mut io::stderr().lock(), histogram)?,
        Err(err) => return Err(err).context("Failed to write output"),
    }
    out.flush()?;
    Ok(())
}

/// Explain on stderr why nothing was exported, with the scan error warning.
fn report_empty<W: Write>(err: &mut W, histogram: &Histogram) -> io::Result<()> {
    writeln!(err, "{}", ExportError::NoData)?;
    write_error_warning(err, histogram)
}

/// Like [`report_empty`], for a root left out of a batch export.
fn report_skipped<W: Write>(err: &mut W, root: &Path, histogram: &Histogram) -> io::Result<()> {
    if !histogram.has_errors() {
        return Ok(());
    }
    writeln!(err, "Skipped '{}': {}", root.display(), ExportError::NoData)?;
    write_error_warning(err, histogram)
}

fn announce(format: OutputFormat, root: &Path) {
    if format == OutputFormat::Text {
        println!("Scanning '{}'...", root.display());
    }
}

fn title(scanner: &Scanner, subject: &str) -> String {
    format!(
        "Disk Space by {}: {subject}",
        scanner.config().timestamp_mode.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use diskogram_core::{ScanWarning, WarningKind};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_select_modes() {
        let cli = Cli::try_parse_from(["diskogram", "-a", "--month", "--json", "/tmp"]).unwrap();
        assert_eq!(cli.timestamp_mode(), TimestampMode::Accessed);
        assert_eq!(cli.interval(), Interval::Month);
        assert_eq!(cli.format(), OutputFormat::Json);

        let cli = Cli::try_parse_from(["diskogram", "/tmp"]).unwrap();
        assert_eq!(cli.timestamp_mode(), TimestampMode::Modified);
        assert_eq!(cli.interval(), Interval::Day);
        assert_eq!(cli.format(), OutputFormat::Text);
    }

    #[test]
    fn test_last_selector_wins() {
        let cli = Cli::try_parse_from(["diskogram", "-m", "-c", "/tmp"]).unwrap();
        assert_eq!(cli.timestamp_mode(), TimestampMode::Changed);
        let cli = Cli::try_parse_from(["diskogram", "-c", "-m", "/tmp"]).unwrap();
        assert_eq!(cli.timestamp_mode(), TimestampMode::Modified);
        let cli = Cli::try_parse_from(["diskogram", "-a", "-m", "-c", "-a", "/tmp"]).unwrap();
        assert_eq!(cli.timestamp_mode(), TimestampMode::Accessed);
        let cli = Cli::try_parse_from(["diskogram", "-c", "-c", "/tmp"]).unwrap();
        assert_eq!(cli.timestamp_mode(), TimestampMode::Changed);

        let cli = Cli::try_parse_from(["diskogram", "--hour", "--day", "/tmp"]).unwrap();
        assert_eq!(cli.interval(), Interval::Day);
        let cli = Cli::try_parse_from(["diskogram", "--year", "--month", "/tmp"]).unwrap();
        assert_eq!(cli.interval(), Interval::Month);

        let cli = Cli::try_parse_from(["diskogram", "--xml", "--csv", "/tmp"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Csv);
        let cli = Cli::try_parse_from(["diskogram", "--csv", "--json", "/tmp"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Json);
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Cli::try_parse_from(["diskogram", "--stdin", "/tmp"]).is_err());
        assert!(Cli::try_parse_from(["diskogram", "--batch", "/tmp"]).is_err());
        assert!(Cli::try_parse_from(["diskogram"]).is_err());
        assert!(Cli::try_parse_from(["diskogram", "/a", "/b"]).is_err());
    }

    #[test]
    fn test_stdin_modes_parse() {
        let cli = Cli::try_parse_from(["diskogram", "--stdin", "--batch", "--csv"]).unwrap();
        assert!(cli.stdin && cli.batch);
        assert!(cli.path.is_none());
    }

    #[test]
    fn test_read_roots_skips_blank_lines() {
        let input = "/var\n\n/home\r\n\n";
        let roots = read_roots(input.as_bytes()).unwrap();
        assert_eq!(roots, vec![PathBuf::from("/var"), PathBuf::from("/home")]);
    }

    #[test]
    fn test_empty_report_carries_error_warning() {
        let mut hist = Histogram::new(Interval::Day);
        hist.record_warning(&ScanWarning::new(
            "/srv/locked",
            "cannot open directory '/srv/locked': Permission denied",
            WarningKind::ReadDir,
        ));
        hist.finalize();

        let mut err = Vec::new();
        report_empty(&mut err, &hist).unwrap();
        let text = String::from_utf8(err).unwrap();
        assert!(text.starts_with("No data to export.\n"));
        assert!(text.contains("WARNING: 1 error(s) occurred during scan"));
        assert!(text.contains("Last error: cannot open directory '/srv/locked'"));
        assert!(text.ends_with("Results may be incomplete.\n"));

        let mut err = Vec::new();
        report_skipped(&mut err, Path::new("/srv"), &hist).unwrap();
        let text = String::from_utf8(err).unwrap();
        assert!(text.starts_with("Skipped '/srv': No data to export.\n"));
        assert!(text.contains("WARNING: 1 error(s)"));
    }

    #[test]
    fn test_empty_report_without_errors() {
        let hist = Histogram::new(Interval::Day);

        let mut err = Vec::new();
        report_empty(&mut err, &hist).unwrap();
        assert_eq!(String::from_utf8(err).unwrap(), "No data to export.\n");

        let mut err = Vec::new();
        report_skipped(&mut err, Path::new("/srv"), &hist).unwrap();
        assert!(err.is_empty());
    }

    #[test]
    fn test_title() {
        let scanner = Scanner::new(ScanConfig::new(TimestampMode::Accessed, Interval::Day));
        assert_eq!(title(&scanner, "/srv"), "Disk Space by Access Time: /srv");
        assert_eq!(title(&scanner, "3 paths"), "Disk Space by Access Time: 3 paths");
    }
}
