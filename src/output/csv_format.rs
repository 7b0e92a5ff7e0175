//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write results in CSV format, one row per visible (host, port) pair.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport, show_all: bool) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "port", "status"])?;

    for host in &report.hosts {
        for result in host.visible(show_all) {
            wtr.write_record([
                host.host.as_str(),
                result.port.to_string().as_str(),
                result.status.to_string().as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
