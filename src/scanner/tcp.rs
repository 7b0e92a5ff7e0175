//! TCP connect prober.
//!
//! Performs standard TCP connect probes using the operating system's socket
//! API. Names are resolved with an asynchronous resolver built from the
//! system configuration (hosts file included), so an abandoned lookup is
//! dropped with its probe instead of pinning a blocking thread.

use crate::error::ProbeError;
use crate::scanner::traits::{PortStatus, Prober};
use crate::types::{Host, Port};
use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{trace, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Descriptors left for the runtime, the resolver and stdio.
#[cfg(unix)]
const RESERVED_DESCRIPTORS: u64 = 128;

/// Socket budget when the open file limit is unknown.
const FALLBACK_BUDGET: usize = 8000;

/// Pause before retrying a connect that found no free descriptor.
const DESCRIPTOR_BACKOFF: Duration = Duration::from_millis(10);

/// How many sockets probes may hold at once, from the soft `NOFILE` limit.
#[cfg(unix)]
pub fn descriptor_budget() -> usize {
    match rlimit::Resource::NOFILE.get() {
        Ok((soft, _)) => budget_from_limit(soft),
        Err(e) => {
            warn!(error = %e, "cannot read the open file limit");
            FALLBACK_BUDGET
        }
    }
}

#[cfg(not(unix))]
pub fn descriptor_budget() -> usize {
    FALLBACK_BUDGET
}

#[cfg(unix)]
fn budget_from_limit(soft: u64) -> usize {
    let usable = soft.saturating_sub(RESERVED_DESCRIPTORS).max(1);
    usize::try_from(usable).unwrap_or(usize::MAX)
}

/// The process (or the system) is out of file descriptors. Says nothing
/// about the remote port.
#[cfg(unix)]
fn descriptors_exhausted(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EMFILE) | Some(libc::ENFILE))
}

#[cfg(not(unix))]
fn descriptors_exhausted(_e: &io::Error) -> bool {
    false
}

/// TCP connect prober.
///
/// Completes the handshake and closes the socket right away; no data is
/// exchanged. Does not require elevated privileges.
pub struct TcpConnectProber {
    resolver: TokioAsyncResolver,
    timeout: Duration,
    socket_budget: usize,
    exhaustion_reported: AtomicBool,
}

impl TcpConnectProber {
    /// Create a prober whose probes, resolution included, finish within
    /// `timeout`, sized to the process descriptor limit.
    pub fn new(timeout: Duration) -> Self {
        Self::with_socket_budget(timeout, descriptor_budget())
    }

    /// Create a prober that allows at most `socket_budget` probes at once.
    pub fn with_socket_budget(timeout: Duration, socket_budget: usize) -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "system resolver configuration unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self {
            resolver,
            timeout,
            socket_budget: socket_budget.max(1),
            exhaustion_reported: AtomicBool::new(false),
        }
    }

    /// Resolve a host to the addresses to try, in resolver order.
    async fn addresses(&self, host: &Host) -> Result<Vec<IpAddr>, ProbeError> {
        if let Some(ip) = host.ip_literal() {
            return Ok(vec![ip]);
        }

        let lookup = self
            .resolver
            .lookup_ip(host.as_str())
            .await
            .map_err(|e| ProbeError::DnsResolution {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        let ips: Vec<IpAddr> = lookup.iter().collect();
        if ips.is_empty() {
            return Err(ProbeError::DnsResolution {
                host: host.to_string(),
                reason: "no addresses found".to_string(),
            });
        }
        Ok(ips)
    }

    /// Try each address of `host` until one accepts, all within one deadline.
    ///
    /// A refusal from any address outranks a later timeout or routing error.
    /// Running out of local descriptors is not an answer from the host: the
    /// same address is tried again until the deadline.
    async fn attempt_connect(&self, host: &Host, port: Port) -> Result<TcpStream, ProbeError> {
        let deadline = Instant::now() + self.timeout;

        let ips = timeout_at(deadline, self.addresses(host))
            .await
            .map_err(|_| ProbeError::Timeout)??;

        let mut refused = false;
        let mut last_error = ProbeError::Timeout;
        'addresses: for ip in ips {
            let addr = SocketAddr::new(ip, port.as_u16());
            loop {
                match timeout_at(deadline, TcpStream::connect(addr)).await {
                    Ok(Ok(stream)) => return Ok(stream),
                    Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                        refused = true;
                        last_error = ProbeError::ConnectionRefused;
                        break;
                    }
                    Ok(Err(e)) if descriptors_exhausted(&e) => {
                        self.report_exhaustion(&e);
                        let left = deadline.saturating_duration_since(Instant::now());
                        if left.is_zero() {
                            last_error = ProbeError::ConnectionFailed(e);
                            break 'addresses;
                        }
                        sleep(DESCRIPTOR_BACKOFF.min(left)).await;
                    }
                    Ok(Err(e)) => {
                        last_error = ProbeError::ConnectionFailed(e);
                        break;
                    }
                    Err(_) => {
                        last_error = ProbeError::Timeout;
                        break 'addresses;
                    }
                }
            }
        }

        if refused {
            Err(ProbeError::ConnectionRefused)
        } else {
            Err(last_error)
        }
    }

    fn report_exhaustion(&self, e: &io::Error) {
        if !self.exhaustion_reported.swap(true, Ordering::Relaxed) {
            warn!(
                error = %e,
                socket_budget = self.socket_budget,
                "out of file descriptors, retrying probes; raise the open file limit or lower -w"
            );
        }
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, host: &Host, port: Port) -> PortStatus {
        match self.attempt_connect(host, port).await {
            Ok(stream) => {
                drop(stream);
                PortStatus::Open
            }
            Err(ProbeError::ConnectionRefused) => PortStatus::Closed,
            Err(e) => {
                trace!(%host, %port, error = %e, "probe unanswered");
                PortStatus::Unreachable
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn max_in_flight(&self) -> usize {
        self.socket_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;
    use tokio::net::TcpListener;

    fn host(s: &str) -> Host {
        Host::new(s).unwrap()
    }

    async fn listener() -> (TcpListener, Port) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        (listener, port)
    }

    #[tokio::test]
    async fn test_open_port() {
        let (_listener, port) = listener().await;
        let prober = TcpConnectProber::new(Duration::from_secs(1));
        assert_eq!(prober.probe(&host("127.0.0.1"), port).await, PortStatus::Open);
    }

    #[tokio::test]
    async fn test_closed_port() {
        // Bind then drop to get a port nobody listens on.
        let (listener, port) = listener().await;
        drop(listener);

        let prober = TcpConnectProber::new(Duration::from_secs(1));
        assert_eq!(prober.probe(&host("127.0.0.1"), port).await, PortStatus::Closed);
    }

    #[tokio::test]
    async fn test_malformed_name_is_unreachable() {
        let prober = TcpConnectProber::new(Duration::from_millis(500));
        let port = Port::new(8080).unwrap();

        let start = StdInstant::now();
        let status = prober.probe(&host("invalid..host..format"), port).await;
        assert_eq!(status, PortStatus::Unreachable);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_probe_respects_deadline() {
        let prober = TcpConnectProber::new(Duration::from_millis(300));
        let port = Port::new(8080).unwrap();

        // Non-routable: either times out or fails fast, never hangs.
        let start = StdInstant::now();
        let status = prober.probe(&host("10.255.255.255"), port).await;
        assert_ne!(status, PortStatus::Open);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_socket_budget_bounds_in_flight() {
        let prober = TcpConnectProber::with_socket_budget(Duration::from_secs(1), 64);
        assert_eq!(prober.max_in_flight(), 64);

        let prober = TcpConnectProber::with_socket_budget(Duration::from_secs(1), 0);
        assert_eq!(prober.max_in_flight(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_budget_leaves_descriptors_in_reserve() {
        assert_eq!(budget_from_limit(1024), 896);
        assert_eq!(budget_from_limit(100), 1);
        assert!(budget_from_limit(u64::MAX) > 1_000_000);
        assert!(descriptor_budget() >= 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_descriptor_exhaustion_is_not_a_port_answer() {
        assert!(descriptors_exhausted(&io::Error::from_raw_os_error(libc::EMFILE)));
        assert!(descriptors_exhausted(&io::Error::from_raw_os_error(libc::ENFILE)));
        assert!(!descriptors_exhausted(&io::Error::from(ErrorKind::ConnectionRefused)));
        assert!(!descriptors_exhausted(&io::Error::from_raw_os_error(libc::ECONNREFUSED)));
    }
}
