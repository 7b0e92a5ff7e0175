//! Command-line interface definitions for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. The values are
//! kept loosely typed here (signed integers, optional paths) so that range,
//! sign and conflict checks happen in [`crate::input`] with descriptive
//! configuration errors instead of generic parser failures.

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  Scan a single host with the default settings:
    portsweep example.com

  Scan a single host with a specific port range:
    portsweep -p 80 -e 443 example.com

  Scan multiple hosts from a file with custom settings:
    portsweep -f hosts.txt -p 1 -e 1024 -w 200

  Scan a single host with ports from a file, listing closed ports too:
    portsweep -P ports.txt -a example.com";

/// A concurrent TCP connect scanner.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check which TCP ports accept connections on one or more hosts", long_about = None)]
#[command(disable_help_flag = true)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// Target host (hostname, IPv4 or IPv6 address)
    #[arg(value_name = "HOST")]
    pub host: Option<String>,

    /// File containing the list of hosts to scan, one per line
    #[arg(short = 'f', value_name = "HOSTS_FILE")]
    pub hosts_file: Option<PathBuf>,

    /// File containing the list of ports to scan, one per line
    #[arg(short = 'P', value_name = "PORTS_FILE")]
    pub ports_file: Option<PathBuf>,

    /// Start port of the scan range [default: 1]
    #[arg(short = 'p', value_name = "PORT", allow_negative_numbers = true)]
    pub start_port: Option<i64>,

    /// End port of the scan range [default: 65535]
    #[arg(short = 'e', value_name = "PORT", allow_negative_numbers = true)]
    pub end_port: Option<i64>,

    /// Number of concurrent workers [default: 100]
    #[arg(short = 'w', value_name = "N", allow_negative_numbers = true)]
    pub workers: Option<i64>,

    /// Show all ports, including closed and unreachable ones
    #[arg(short = 'a')]
    pub show_all: bool,

    /// Output format for results [default: plain]
    #[arg(short = 'o', long = "output", value_enum)]
    pub output: Option<OutputFormat>,

    /// Show a progress bar and debug logs on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show help
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,
}

impl Args {
    /// Render the usage text, as printed for `-h`.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
