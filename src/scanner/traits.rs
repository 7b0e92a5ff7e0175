//! Prober trait abstraction.
//!
//! Defines the interface the worker pool drives, so the pool can be exercised
//! with scripted probers in tests and the TCP connect prober in production.

use crate::types::{Host, Port};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status of a probed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// A connection was established.
    Open,
    /// The host actively refused the connection (RST).
    Closed,
    /// No answer before the deadline, the name did not resolve, or the
    /// network could not route the attempt.
    Unreachable,
}

impl PortStatus {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    /// The port number that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: PortStatus,
}

impl PortResult {
    pub fn new(port: Port, status: PortStatus) -> Self {
        Self { port, status }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Trait for probe implementations.
///
/// Implementations must return within [`Prober::timeout`]; the pool relies on
/// that bound for its shutdown latency. A probe never fails: every problem
/// maps to a [`PortStatus`].
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one (host, port) pair.
    async fn probe(&self, host: &Host, port: Port) -> PortStatus;

    /// Upper bound on the duration of a single probe.
    fn timeout(&self) -> Duration;

    /// How many probes may run at once before they start competing for
    /// local resources. The pool never runs more workers than this.
    fn max_in_flight(&self) -> usize {
        usize::MAX
    }
}
