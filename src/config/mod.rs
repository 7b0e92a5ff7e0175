//! Configuration management for portsweep.
//!
//! Provides the optional XDG-located settings file that supplies defaults
//! the command line does not expose.

mod settings;

pub use settings::{AppSettings, Paths, DEFAULT_PROBE_TIMEOUT, DEFAULT_WORKERS};
