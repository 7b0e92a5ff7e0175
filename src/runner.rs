//! Top-level orchestration of a single invocation.
//!
//! Validates input, scans with interrupt handling armed, then prints the
//! report. Everything that fails before the first probe surfaces as a
//! [`CliError`](crate::error::CliError).

use crate::cli::Args;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::input;
use crate::output;
use crate::scanner::{run_scan, ScanReport, TcpConnectProber};
use crate::signal::CancellationCoordinator;
use std::sync::Arc;
use tracing::debug;

/// How an invocation ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every unit was probed and the report printed.
    Completed,
    /// Cancelled mid-scan; a partial report was printed.
    Interrupted,
    /// `-h` was given; usage was printed and nothing was scanned.
    HelpShown,
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Completed | Self::HelpShown => 0,
            Self::Interrupted => 130,
        }
    }

    fn from_report(report: &ScanReport) -> Self {
        if report.interrupted {
            Self::Interrupted
        } else {
            Self::Completed
        }
    }
}

/// Run the scan described by `args` and print its report to stdout.
pub async fn execute(args: Args) -> CliResult<RunOutcome> {
    if args.help {
        eprint!("{}", Args::usage());
        return Ok(RunOutcome::HelpShown);
    }

    let settings = AppSettings::load(args.config.as_deref())?;
    let config = input::resolve(&args, &settings)?;
    debug!(timeout = ?config.probe_timeout, output = %config.output, "configuration ready");

    let coordinator = CancellationCoordinator::install();
    let prober = Arc::new(TcpConnectProber::new(config.probe_timeout));
    let report = run_scan(&config, prober, coordinator.token()).await;
    coordinator.disarm();

    output::print_results(&report, config.output, config.show_all)?;

    Ok(RunOutcome::from_report(&report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CliError, ConfigError};

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunOutcome::Completed.exit_code(), 0);
        assert_eq!(RunOutcome::HelpShown.exit_code(), 0);
        assert_eq!(RunOutcome::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_help_skips_scan() {
        let args = Args {
            help: true,
            ..Args::default()
        };
        let outcome = tokio_test::block_on(execute(args)).unwrap();
        assert_eq!(outcome, RunOutcome::HelpShown);
    }

    #[tokio::test]
    async fn test_missing_target_fails_before_scanning() {
        let err = execute(Args::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::MissingTarget)));
        assert!(err.wants_usage());
    }
}
