//! Turns raw command-line values and list files into a validated scan
//! configuration.
//!
//! Everything here runs before the first probe. Any conflict or malformed
//! entry aborts the run. Hosts are not resolved at this stage: an
//! unresolvable host is a per-target failure handled by the prober, while a
//! malformed port is fatal because it has no meaning at scan time.

use crate::cli::Args;
use crate::config::AppSettings;
use crate::error::{CliResult, ConfigError, InputError, ListKind};
use crate::scanner::ScanConfig;
use crate::types::{Host, HostSet, Port, PortRange, PortSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the port list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSource {
    Range(PortRange),
    File(PathBuf),
}

/// Where the host list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    Single(Host),
    File(PathBuf),
}

/// Build the scan configuration, reading list files as needed.
pub fn resolve(args: &Args, settings: &AppSettings) -> CliResult<ScanConfig> {
    let port_source = port_source(args)?;
    let host_source = host_source(args)?;
    let workers = worker_count(args.workers, settings)?;

    let ports = match port_source {
        PortSource::Range(range) => PortSet::from(range),
        PortSource::File(path) => read_ports_file(&path)?,
    };
    let hosts = match host_source {
        HostSource::Single(host) => HostSet::single(host),
        HostSource::File(path) => read_hosts_file(&path)?,
    };

    debug!(
        hosts = hosts.len(),
        ports = ports.len(),
        workers,
        "resolved scan input"
    );

    Ok(ScanConfig {
        hosts,
        ports,
        workers,
        probe_timeout: settings.probe_timeout(),
        show_all: args.show_all,
        output: args.output.unwrap_or(settings.default_output_format),
        verbose: args.verbose,
    })
}

/// Decide between an explicit range and a ports file.
pub fn port_source(args: &Args) -> Result<PortSource, ConfigError> {
    let has_range = args.start_port.is_some() || args.end_port.is_some();

    if let Some(path) = &args.ports_file {
        if has_range {
            return Err(ConfigError::PortsFileWithRange);
        }
        return Ok(PortSource::File(path.clone()));
    }

    let range = match (args.start_port, args.end_port) {
        (None, None) => PortRange::full(),
        (Some(_), None) => return Err(ConfigError::MissingRangeBound('p', 'e')),
        (None, Some(_)) => return Err(ConfigError::MissingRangeBound('e', 'p')),
        (Some(start), Some(end)) => {
            let start = range_bound("start", start)?;
            let end = range_bound("end", end)?;
            PortRange::new(start, end)
                .map_err(|_| ConfigError::ReversedRange(start.as_u16(), end.as_u16()))?
        }
    };
    Ok(PortSource::Range(range))
}

fn range_bound(which: &str, value: i64) -> Result<Port, ConfigError> {
    Port::from_i64(value).ok_or_else(|| {
        ConfigError::InvalidPort(format!(
            "{which} port {value} is out of valid range ({}-{})",
            Port::MIN,
            Port::MAX
        ))
    })
}

/// Decide between a single positional host and a hosts file.
pub fn host_source(args: &Args) -> Result<HostSource, ConfigError> {
    let host = args.host.as_deref().and_then(Host::new);
    match (&args.hosts_file, host) {
        (Some(_), Some(_)) => Err(ConfigError::HostsFileWithHost),
        (Some(path), None) => Ok(HostSource::File(path.clone())),
        (None, Some(host)) => Ok(HostSource::Single(host)),
        (None, None) => Err(ConfigError::MissingTarget),
    }
}

/// Validate the worker count; the settings default applies when absent.
pub fn worker_count(requested: Option<i64>, settings: &AppSettings) -> Result<usize, ConfigError> {
    match requested {
        None => Ok(settings.default_workers),
        Some(n) if n <= 0 => Err(ConfigError::InvalidWorkerCount(n)),
        Some(n) => usize::try_from(n).map_err(|_| ConfigError::InvalidWorkerCount(n)),
    }
}

/// Read a ports file: one port per line, blank lines ignored, duplicates
/// dropped after their first occurrence.
pub fn read_ports_file(path: &Path) -> Result<PortSet, InputError> {
    let content = read_list(ListKind::Ports, path)?;
    parse_ports(&content)
}

/// Parse the contents of a ports file.
pub fn parse_ports(content: &str) -> Result<PortSet, InputError> {
    let mut ports = PortSet::new();

    for (index, line) in content.lines().enumerate() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }
        let port: Port = entry.parse().map_err(|_| InputError::InvalidPort {
            entry: entry.to_string(),
            line: index + 1,
        })?;
        ports.insert(port);
    }

    if ports.is_empty() {
        return Err(InputError::Empty(ListKind::Ports));
    }
    Ok(ports)
}

/// Read a hosts file: one host per line, blank lines ignored, repeats kept.
pub fn read_hosts_file(path: &Path) -> Result<HostSet, InputError> {
    let content = read_list(ListKind::Hosts, path)?;
    parse_hosts(&content)
}

/// Parse the contents of a hosts file.
pub fn parse_hosts(content: &str) -> Result<HostSet, InputError> {
    let hosts: HostSet = content.lines().filter_map(Host::new).collect();
    if hosts.is_empty() {
        return Err(InputError::Empty(ListKind::Hosts));
    }
    Ok(hosts)
}

fn read_list(kind: ListKind, path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
