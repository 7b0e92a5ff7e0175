//! portsweep - concurrent TCP connectivity scanner.

use anyhow::{Context, Result};
use clap::Parser;
use portsweep::cli::Args;
use portsweep::runner;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How long to wait for stray tasks once the report has been printed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let outcome = runtime.block_on(runner::execute(args));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    match outcome {
        Ok(outcome) => Ok(ExitCode::from(outcome.exit_code())),
        Err(e) => {
            println!("{e}");
            if e.wants_usage() {
                eprint!("{}", Args::usage());
            }
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "portsweep=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::user_attended_stderr())
        .with_target(false)
        .init();
}
