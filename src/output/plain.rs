//! Plain text output formatting.
//!
//! The report itself is unstyled line-oriented text; only the stderr
//! warnings use colors.

use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

/// Write results in the line-oriented plain text format.
///
/// Per host occurrence: a `Scanning host:` header, one `Port N: status` line
/// per visible port, then either the open-port total or, without
/// `show_all`, a `No open ports found` notice.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport, show_all: bool) -> io::Result<()> {
    for host in &report.hosts {
        // Hosts the interrupted scan never reached have nothing to say.
        if report.interrupted && host.results.is_empty() {
            continue;
        }

        writeln!(out, "Scanning host: {}", host.host)?;
        for result in host.visible(show_all) {
            writeln!(out, "Port {}: {}", result.port, result.status)?;
        }

        if host.any_open() {
            writeln!(out, "Total open ports: {}", host.open_ports)?;
        } else if !show_all {
            writeln!(out, "No open ports found")?;
        }
        writeln!(out)?;
    }

    if report.interrupted {
        print_warning(&format!(
            "scan interrupted: {} of {} probes completed",
            report.completed_units, report.total_units
        ));
    }

    Ok(())
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold().for_stderr(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::{mixed, report, result};
    use crate::scanner::{HostReport, PortStatus};

    fn render(report: &ScanReport, show_all: bool) -> String {
        let mut buf = Vec::new();
        write_plain(&mut buf, report, show_all).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_open_only() {
        let text = render(&mixed(), false);
        assert_eq!(
            text,
            "Scanning host: localhost\n\
             Port 8080: open\n\
             Total open ports: 1\n\
             \n\
             Scanning host: invalid.host.local\n\
             No open ports found\n\
             \n"
        );
    }

    #[test]
    fn test_show_all_lists_every_port() {
        let text = render(&mixed(), true);
        assert!(text.contains("Port 8080: open\n"));
        assert!(text.contains("Port 9999: closed\n"));
        assert!(text.contains("Port 8080: unreachable\n"));
        assert!(!text.contains("No open ports found"));
    }

    #[test]
    fn test_each_port_once_per_host_occurrence() {
        let host = || {
            HostReport::new(
                "localhost".to_string(),
                vec![
                    result(8082, PortStatus::Open),
                    result(8080, PortStatus::Open),
                    result(8081, PortStatus::Closed),
                ],
            )
        };
        let text = render(&report(vec![host(), host()]), true);
        assert_eq!(text.matches("Scanning host: localhost").count(), 2);
        for port in ["8080", "8081", "8082"] {
            assert_eq!(text.matches(&format!("Port {port}:")).count(), 2);
        }
        let first = text.find("Port 8082").unwrap();
        let second = text.find("Port 8080").unwrap();
        assert!(first < second, "ports keep list order");
    }

    #[test]
    fn test_interrupted_skips_unreached_hosts() {
        let mut partial = report(vec![
            HostReport::new("a".to_string(), vec![result(80, PortStatus::Open)]),
            HostReport::new("b".to_string(), Vec::new()),
        ]);
        partial.interrupted = true;
        partial.total_units = 2;
        partial.completed_units = 1;

        let text = render(&partial, false);
        assert!(text.contains("Scanning host: a"));
        assert!(!text.contains("Scanning host: b"));
    }
}
