//! # portsweep - concurrent TCP connectivity scanner
//!
//! Probes every (host, port) pair from a host list and a port list with a
//! full TCP connect and reports which ports accept connections.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{run_scan, ScanConfig, TcpConnectProber};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let prober = Arc::new(TcpConnectProber::new(config.probe_timeout));
//! let report = run_scan(&config, prober, CancellationToken::new()).await;
//! for host in &report.hosts {
//!     println!("{}: {} open", host.host, host.open_ports);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line surface
//! - [`input`] - Turns arguments and list files into a [`scanner::ScanConfig`]
//! - [`scanner`] - Unit source, worker pool, prober and result aggregation
//! - [`signal`] - Interrupt handling
//! - [`output`] - Plain, JSON and CSV reports
//! - [`config`] - Optional settings file
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod runner;
pub mod scanner;
pub mod signal;
pub mod types;

pub use error::{CliError, ConfigError, InputError};
pub use scanner::{run_scan, PortResult, PortStatus, Prober, ScanConfig, ScanReport};
pub use types::{Host, HostSet, Port, PortRange, PortSet};
