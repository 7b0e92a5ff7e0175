//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.
//! Reports go to stdout; diagnostics go to stderr.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_warning, write_plain};

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Format and print scan results according to the specified format.
pub fn print_results(report: &ScanReport, format: OutputFormat, show_all: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, report, format, show_all)?;
    out.flush()
}

/// Format scan results into any writer.
pub fn write_results<W: Write>(
    out: &mut W,
    report: &ScanReport,
    format: OutputFormat,
    show_all: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report, show_all),
        OutputFormat::Json => write_json(out, report, show_all),
        OutputFormat::Csv => write_csv(out, report, show_all),
    }
}
