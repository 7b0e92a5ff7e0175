//! Collects probe outcomes and rebuilds them in report order.
//!
//! Workers finish units in any order. The aggregator owns a slot per unit,
//! filled exactly once, and only hands out per-host views after the pool has
//! drained.

use crate::scanner::jobs::ScanJobs;
use crate::scanner::traits::{PortResult, PortStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Outcome slots for every unit of a scan, in host-major order.
#[derive(Debug)]
pub struct ResultAggregator {
    slots: Vec<Option<PortStatus>>,
    completed: usize,
}

impl ResultAggregator {
    pub fn new(units: usize) -> Self {
        Self {
            slots: vec![None; units],
            completed: 0,
        }
    }

    /// Store the outcome of unit `index`. Returns `false` if the slot was
    /// already filled or does not exist; the first write wins.
    pub fn record(&mut self, index: usize, status: PortStatus) -> bool {
        match self.slots.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(status);
                self.completed += 1;
                true
            }
            Some(Some(_)) => {
                warn!(index, "duplicate outcome for scan unit ignored");
                false
            }
            None => {
                warn!(index, "outcome for unknown scan unit ignored");
                false
            }
        }
    }

    /// Number of units with an outcome.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Group outcomes per host occurrence, ports in list order. Units without
    /// an outcome (never dispatched) are left out.
    pub fn into_hosts(self, jobs: &ScanJobs) -> Vec<HostReport> {
        let per_host = jobs.ports().len();
        jobs.hosts()
            .iter()
            .enumerate()
            .map(|(host_index, host)| {
                let base = host_index * per_host;
                let results = jobs
                    .ports()
                    .iter()
                    .enumerate()
                    .filter_map(|(port_index, port)| {
                        self.slots
                            .get(base + port_index)
                            .copied()
                            .flatten()
                            .map(|status| PortResult::new(port, status))
                    })
                    .collect();
                HostReport::new(host.to_string(), results)
            })
            .collect()
    }
}

/// Outcomes for one host occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub host: String,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub unreachable_ports: usize,
    pub results: Vec<PortResult>,
}

impl HostReport {
    pub fn new(host: String, results: Vec<PortResult>) -> Self {
        let count = |status: PortStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            open_ports: count(PortStatus::Open),
            closed_ports: count(PortStatus::Closed),
            unreachable_ports: count(PortStatus::Unreachable),
            host,
            results,
        }
    }

    /// Whether any probed port on this host was open.
    pub fn any_open(&self) -> bool {
        self.open_ports > 0
    }

    /// Results to display: everything with `show_all`, open ports otherwise.
    pub fn visible(&self, show_all: bool) -> impl Iterator<Item = &PortResult> {
        self.results.iter().filter(move |r| show_all || r.is_open())
    }
}

/// The finished scan, ready for the reporter.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub workers: usize,
    pub ports_per_host: usize,
    pub total_units: usize,
    pub completed_units: usize,
    pub interrupted: bool,
    pub hosts: Vec<HostReport>,
}
