//! JSON output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write results as one pretty-printed JSON document.
///
/// Per-host counters always cover every probed port; the `results` lists
/// only carry non-open ports with `show_all`.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport, show_all: bool) -> io::Result<()> {
    let mut report = report.clone();
    for host in &mut report.hosts {
        host.results.retain(|r| show_all || r.is_open());
    }

    serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::other)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::mixed;
    use serde_json::Value;

    fn render(show_all: bool) -> Value {
        let mut buf = Vec::new();
        write_json(&mut buf, &mixed(), show_all).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_open_only_results() {
        let json = render(false);
        let hosts = json["hosts"].as_array().unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0]["host"], "localhost");
        assert_eq!(hosts[0]["results"].as_array().unwrap().len(), 1);
        assert_eq!(hosts[0]["results"][0]["port"], 8080);
        assert_eq!(hosts[0]["results"][0]["status"], "open");
        assert_eq!(hosts[0]["closed_ports"], 1);
        assert_eq!(hosts[1]["unreachable_ports"], 2);
        assert_eq!(json["interrupted"], false);
    }

    #[test]
    fn test_show_all_results() {
        let json = render(true);
        assert_eq!(json["hosts"][1]["results"].as_array().unwrap().len(), 2);
        assert_eq!(json["hosts"][1]["results"][0]["status"], "unreachable");
    }
}
