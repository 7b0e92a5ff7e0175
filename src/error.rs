//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Configuration and input
//! errors abort a run before any probe is sent; per-target failures never
//! surface here, they become a port status instead.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single connection attempt did not succeed.
///
/// Never fatal: the prober folds these into a port status.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection refused")]
    ConnectionRefused,

    #[error("connection timed out")]
    Timeout,

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsResolution { host: String, reason: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(#[from] std::io::Error),
}

/// Invalid or conflicting command-line configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port configuration: {0}")]
    InvalidPort(String),

    #[error("invalid port range: start ({0}) > end ({1})")]
    ReversedRange(u16, u16),

    #[error("-{0} requires -{1}")]
    MissingRangeBound(char, char),

    #[error("cannot combine a ports file (-P) with a port range (-p/-e)")]
    PortsFileWithRange,

    #[error("cannot combine a hosts file (-f) with a positional host")]
    HostsFileWithHost,

    #[error("no target given: pass a host or a hosts file with -f")]
    MissingTarget,

    #[error("number of workers must be greater than 0 (got {0})")]
    InvalidWorkerCount(i64),
}

/// Which list file an [`InputError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Hosts,
    Ports,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hosts => write!(f, "hosts"),
            Self::Ports => write!(f, "ports"),
        }
    }
}

/// Malformed or missing list file content.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("{}: {source}", path.display())]
    Read {
        kind: ListKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("empty {0} file")]
    Empty(ListKind),

    #[error("invalid port number: {entry} (line {line})")]
    InvalidPort { entry: String, line: usize },
}

impl InputError {
    /// The list file the error came from.
    pub fn kind(&self) -> ListKind {
        match self {
            Self::Read { kind, .. } | Self::Empty(kind) => *kind,
            Self::InvalidPort { .. } => ListKind::Ports,
        }
    }
}

/// Problems with the optional settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for the command-line front end.
///
/// The display form is the complete line shown to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Error: {0}")]
    Config(#[from] ConfigError),

    #[error("Error reading {kind} file: {0}", kind = .0.kind())]
    Input(#[from] InputError),

    #[error("Error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Error: failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Whether the usage text should follow the error message.
    pub fn wants_usage(&self) -> bool {
        matches!(self, Self::Config(ConfigError::MissingTarget))
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for the command-line front end.
pub type CliResult<T> = Result<T, CliError>;
