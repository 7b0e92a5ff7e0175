//! The scan unit source.
//!
//! Units are the host-major cross product of the host list and the port list.
//! They are never materialized: a unit is derived from its index, and workers
//! claim indices from a shared atomic cursor.

use crate::types::{Host, HostSet, Port, PortSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One (host, port) pair to probe, with its position in the cross product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUnit {
    /// Position in host-major order.
    pub index: usize,
    /// Position of the host occurrence in the host list.
    pub host_index: usize,
    /// Position of the port in the port list.
    pub port_index: usize,
    pub host: Host,
    pub port: Port,
}

/// Shared, thread-safe source of scan units.
#[derive(Debug)]
pub struct ScanJobs {
    hosts: HostSet,
    ports: PortSet,
    cursor: AtomicUsize,
}

impl ScanJobs {
    pub fn new(hosts: HostSet, ports: PortSet) -> Self {
        Self {
            hosts,
            ports,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Total number of units.
    pub fn total_units(&self) -> usize {
        self.hosts.len() * self.ports.len()
    }

    pub fn hosts(&self) -> &HostSet {
        &self.hosts
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    /// The unit at `index` in host-major order.
    pub fn unit(&self, index: usize) -> Option<ScanUnit> {
        let per_host = self.ports.len();
        if per_host == 0 {
            return None;
        }
        let host_index = index / per_host;
        let port_index = index % per_host;
        let host = self.hosts.get(host_index)?;
        let port = self.ports.get(port_index)?;
        Some(ScanUnit {
            index,
            host_index,
            port_index,
            host: host.clone(),
            port,
        })
    }

    /// Claim the next unit nobody has taken yet.
    pub fn claim(&self) -> Option<ScanUnit> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        if index >= self.total_units() {
            // Keep the cursor from wrapping when many idle workers spin here.
            self.cursor.store(self.total_units(), Ordering::Relaxed);
            return None;
        }
        self.unit(index)
    }

    /// Every unit in order, independent of what has been claimed.
    pub fn iter(&self) -> impl Iterator<Item = ScanUnit> + '_ {
        (0..self.total_units()).filter_map(move |index| self.unit(index))
    }
}
