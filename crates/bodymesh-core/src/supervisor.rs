//! Owns the poller task for the lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::poller::Poller;

/// Configuration for the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// How long shutdown waits for the poller before aborting it.
    pub grace: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
        }
    }
}

/// How the poller task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Observed cancellation and returned in time.
    Graceful,
    /// Did not return within the grace period and was aborted.
    Aborted,
    /// Had already died, for example by panicking.
    Crashed,
}

/// Single owner of the poller task.
///
/// Only one poller runs per supervisor, so ticks never overlap.
pub struct Supervisor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    config: SupervisorConfig,
}

impl Supervisor {
    /// Spawns the poller. Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(poller: Poller, config: SupervisorConfig) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let poller = Arc::new(poller);
        let handle = tokio::spawn(async move { poller.run(token).await });
        info!("Supervisor started poller");
        Self {
            cancel,
            handle,
            config,
        }
    }

    /// Returns true once the poller task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the poller and waits for it within the grace period.
    ///
    /// Never panics, whatever state the task is in.
    pub async fn shutdown(self) -> ShutdownOutcome {
        let Self {
            cancel,
            mut handle,
            config,
        } = self;
        cancel.cancel();

        match tokio::time::timeout(config.grace, &mut handle).await {
            Ok(Ok(())) => {
                info!("Poller shut down cleanly");
                ShutdownOutcome::Graceful
            }
            Ok(Err(e)) => {
                error!("Poller task ended abnormally: {e}");
                ShutdownOutcome::Crashed
            }
            Err(_) => {
                warn!(grace = ?config.grace, "Poller did not stop in time, aborting");
                handle.abort();
                ShutdownOutcome::Aborted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grace() {
        assert_eq!(SupervisorConfig::default().grace, Duration::from_secs(10));
    }
}
