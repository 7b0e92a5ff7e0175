//! Interrupt handling.
//!
//! Turns SIGINT (and SIGTERM on Unix) into a cooperative stop request. The
//! token only stops new work from being dispatched; probes already running
//! finish within their own deadline.

use crate::output::print_warning;
use std::io;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the stop token and the task listening for interrupts.
pub struct CancellationCoordinator {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl CancellationCoordinator {
    /// Start listening for interrupts. Must be called inside a tokio runtime.
    pub fn install() -> Self {
        let token = CancellationToken::new();
        let listener = tokio::spawn(listen(token.clone()));
        Self { token, listener }
    }

    /// A handle for the worker pool.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop listening once the scan no longer needs it.
    pub fn disarm(self) {
        self.listener.abort();
    }
}

async fn listen(token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        received = wait_for_signal() => match received {
            Ok(name) => {
                info!(signal = name, "interrupt received, draining in-flight probes");
                print_warning("interrupted, waiting for in-flight probes to finish");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for interrupts"),
        },
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fresh_coordinator_is_not_cancelled() {
        let coordinator = CancellationCoordinator::install();
        assert!(!coordinator.is_cancelled());
        assert!(!coordinator.token().is_cancelled());
        coordinator.disarm();
    }

    #[tokio::test]
    async fn test_listener_exits_once_token_is_cancelled() {
        let coordinator = CancellationCoordinator::install();
        coordinator.token().cancel();
        assert!(coordinator.is_cancelled());

        let CancellationCoordinator { listener, .. } = coordinator;
        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .expect("listener should stop after cancellation")
            .unwrap();
    }
}
