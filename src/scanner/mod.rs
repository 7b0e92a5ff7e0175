//! Scanner module - the concurrent scan engine.
//!
//! A fixed pool of tokio tasks claims units from [`ScanJobs`], probes them
//! through a [`Prober`], and sends each outcome to a single aggregator task
//! that owns all result state. Cancellation is checked before a unit is
//! claimed, never mid-probe, so shutdown latency is bounded by the probe
//! timeout.

pub mod aggregate;
pub mod jobs;
pub mod tcp;
pub mod traits;

use crate::cli::OutputFormat;
use crate::types::{HostSet, PortSet};
use chrono::Utc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

pub use aggregate::{HostReport, ResultAggregator, ScanReport};
pub use jobs::{ScanJobs, ScanUnit};
pub use tcp::TcpConnectProber;
pub use traits::{PortResult, PortStatus, Prober};

/// Upper bound on outcomes buffered between workers and the aggregator.
const RESULT_BUFFER: usize = 1024;

/// Validated, read-only configuration for one run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub hosts: HostSet,
    pub ports: PortSet,
    /// Configured pool size (at least 1).
    pub workers: usize,
    pub probe_timeout: Duration,
    pub show_all: bool,
    pub output: OutputFormat,
    pub verbose: bool,
}

/// Execute a complete scan and return the ordered report.
///
/// Returns once every unit has an outcome, or, after `cancel` fires, once the
/// probes already in flight have finished.
pub async fn run_scan(
    config: &ScanConfig,
    prober: Arc<dyn Prober>,
    cancel: CancellationToken,
) -> ScanReport {
    let started_at = Utc::now();
    let start_time = Instant::now();

    let jobs = Arc::new(ScanJobs::new(config.hosts.clone(), config.ports.clone()));
    let total_units = jobs.total_units();

    // Extra workers would only find an exhausted unit source, or compete
    // for descriptors and misreport ports they could not open a socket for.
    let pool_size = config.workers.min(total_units);
    let in_flight_limit = prober.max_in_flight();
    let pool_size = if pool_size > in_flight_limit {
        warn!(
            workers = config.workers,
            limit = in_flight_limit,
            "worker count exceeds the open file limit, running fewer concurrent probes"
        );
        in_flight_limit
    } else {
        pool_size
    };

    info!(
        hosts = config.hosts.len(),
        ports = config.ports.len(),
        workers = config.workers,
        pool_size,
        timeout = ?prober.timeout(),
        "starting scan"
    );

    let progress = if config.verbose {
        Some(progress_bar(total_units as u64))
    } else {
        None
    };

    let (tx, mut rx) = mpsc::channel::<(usize, PortStatus)>(RESULT_BUFFER);

    let aggregator = tokio::spawn(async move {
        let mut aggregator = ResultAggregator::new(total_units);
        while let Some((index, status)) = rx.recv().await {
            aggregator.record(index, status);
        }
        aggregator
    });

    let workers: Vec<_> = (0..pool_size)
        .map(|_| {
            tokio::spawn(worker(
                Arc::clone(&jobs),
                Arc::clone(&prober),
                tx.clone(),
                cancel.clone(),
                progress.clone(),
            ))
        })
        .collect();
    drop(tx);

    for joined in join_all(workers).await {
        if let Err(e) = joined {
            warn!(error = %e, "scan worker exited abnormally");
        }
    }

    let aggregator = match aggregator.await {
        Ok(aggregator) => aggregator,
        Err(e) => {
            warn!(error = %e, "result aggregator exited abnormally");
            ResultAggregator::new(total_units)
        }
    };

    let completed_units = aggregator.completed();
    let interrupted = completed_units < total_units;

    if let Some(pb) = progress {
        if interrupted {
            pb.abandon_with_message("Scan interrupted");
        } else {
            pb.finish_with_message("Scan complete");
        }
    }

    if interrupted {
        info!(completed_units, total_units, "scan interrupted before completion");
    } else {
        info!(total_units, "scan complete");
    }

    ScanReport {
        started_at,
        finished_at: Utc::now(),
        duration_ms: start_time.elapsed().as_millis() as u64,
        workers: config.workers,
        ports_per_host: config.ports.len(),
        total_units,
        completed_units,
        interrupted,
        hosts: aggregator.into_hosts(&jobs),
    }
}

/// One pool member: claim, probe, report, until the source is empty or the
/// scan is cancelled.
async fn worker(
    jobs: Arc<ScanJobs>,
    prober: Arc<dyn Prober>,
    results: mpsc::Sender<(usize, PortStatus)>,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let Some(unit) = jobs.claim() else {
            break;
        };

        let status = prober.probe(&unit.host, unit.port).await;
        trace!(host = %unit.host, port = %unit.port, %status, "probe finished");

        if results.send((unit.index, status)).await.is_err() {
            break;
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
            if status.is_open() {
                pb.set_message(format!("open: {}:{}", unit.host, unit.port));
            }
        }
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .map(|style| style.progress_chars("=>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Host, Port};
    use async_trait::async_trait;

    /// Reports every port below 1000 as open, everything else as closed.
    struct SplitProber;

    #[async_trait]
    impl Prober for SplitProber {
        async fn probe(&self, _host: &Host, port: Port) -> PortStatus {
            if port.as_u16() < 1000 {
                PortStatus::Open
            } else {
                PortStatus::Closed
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(10)
        }
    }

    fn config(hosts: &[&str], ports: &[u16], workers: usize) -> ScanConfig {
        ScanConfig {
            hosts: hosts.iter().filter_map(|h| Host::new(h)).collect(),
            ports: ports.iter().filter_map(|&p| Port::new(p)).collect(),
            workers,
            probe_timeout: Duration::from_millis(10),
            show_all: false,
            output: OutputFormat::Plain,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_every_unit_gets_one_outcome() {
        let config = config(&["a", "b", "a"], &[22, 8080, 80], 4);
        let report = run_scan(&config, Arc::new(SplitProber), CancellationToken::new()).await;

        assert!(!report.interrupted);
        assert_eq!(report.total_units, 9);
        assert_eq!(report.completed_units, 9);
        let hosts: Vec<&str> = report.hosts.iter().map(|h| h.host.as_str()).collect();
        assert_eq!(hosts, vec!["a", "b", "a"]);
        for host in &report.hosts {
            let ports: Vec<u16> = host.results.iter().map(|r| r.port.as_u16()).collect();
            assert_eq!(ports, vec![22, 8080, 80]);
            assert_eq!(host.open_ports, 2);
            assert_eq!(host.closed_ports, 1);
        }
    }

    #[tokio::test]
    async fn test_pre_cancelled_scan_probes_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let config = config(&["a"], &[1, 2, 3], 2);
        let report = run_scan(&config, Arc::new(SplitProber), cancel).await;

        assert!(report.interrupted);
        assert_eq!(report.completed_units, 0);
        assert!(report.hosts[0].results.is_empty());
    }

    /// Tracks the peak number of concurrent probes.
    struct BoundedProber {
        limit: usize,
        running: std::sync::atomic::AtomicUsize,
        peak: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Prober for BoundedProber {
        async fn probe(&self, _host: &Host, _port: Port) -> PortStatus {
            use std::sync::atomic::Ordering;
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            PortStatus::Open
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(10)
        }

        fn max_in_flight(&self) -> usize {
            self.limit
        }
    }

    #[tokio::test]
    async fn test_pool_respects_prober_limit() {
        let prober = Arc::new(BoundedProber {
            limit: 3,
            running: Default::default(),
            peak: Default::default(),
        });
        let ports: Vec<u16> = (1..=60).collect();
        let config = config(&["a"], &ports, 10_000);

        let shared: Arc<dyn Prober> = Arc::clone(&prober) as Arc<dyn Prober>;
        let report = run_scan(&config, shared, CancellationToken::new()).await;

        assert_eq!(report.completed_units, 60);
        assert_eq!(report.hosts[0].open_ports, 60);
        assert_eq!(report.workers, 10_000);
        let peak = prober.peak.load(std::sync::atomic::Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight probes was {peak}");
    }

    #[tokio::test]
    async fn test_huge_worker_count() {
        let config = config(&["a"], &[8080], 1_000_000);
        let report = run_scan(&config, Arc::new(SplitProber), CancellationToken::new()).await;
        assert_eq!(report.workers, 1_000_000);
        assert_eq!(report.completed_units, 1);
    }
}
