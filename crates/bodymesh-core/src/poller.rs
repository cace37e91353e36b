//! Background reconciliation of pending reconstruction sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{AvatarStatus, MeshAttachment, MeshFormat, MeshUrls, PendingSession};
use crate::error::{log_reconciliation, UpstreamError};
use crate::ports::{RecordStore, RegistrationHook};
use crate::session::{SessionCheck, SessionClient};

/// Configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause after every tick, however long the tick took.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Summary of one poll tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sessions listed as pending.
    pub pending: usize,
    /// Session ids moved to `complete` in this tick.
    pub completed: Vec<String>,
    /// Sessions checked and found unfinished.
    pub not_ready: usize,
    /// Session ids whose status request failed.
    pub failed_checks: Vec<String>,
}

/// Checks pending sessions and completes the ready ones.
pub struct Poller {
    store: Arc<dyn RecordStore>,
    sessions: SessionClient,
    registration: Arc<dyn RegistrationHook>,
    config: PollerConfig,
}

impl Poller {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: SessionClient,
        registration: Arc<dyn RegistrationHook>,
        config: PollerConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            registration,
            config,
        }
    }

    /// Runs one tick: lists pending sessions and checks them one at a time.
    ///
    /// A failed check is recorded in the report and the remaining sessions
    /// are still checked. Completion steps are best-effort and never fail
    /// the tick.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pending sessions cannot be listed.
    pub async fn tick(&self) -> Result<TickReport, UpstreamError> {
        let pending = self.store.list_pending_sessions().await?;
        let mut report = TickReport {
            pending: pending.len(),
            ..TickReport::default()
        };

        for session in &pending {
            match self.sessions.check_session(&session.session_id).await {
                Ok(SessionCheck::Ready(urls)) => {
                    self.complete(session, &urls).await;
                    report.completed.push(session.session_id.clone());
                }
                Ok(SessionCheck::NotReady { status }) => {
                    debug!(session_id = %session.session_id, %status, "Model not ready");
                    report.not_ready += 1;
                }
                Err(e) => {
                    warn!(session_id = %session.session_id, "Session check failed: {e}");
                    report.failed_checks.push(session.session_id.clone());
                }
            }
        }

        debug!(
            pending = report.pending,
            completed = report.completed.len(),
            not_ready = report.not_ready,
            failed = report.failed_checks.len(),
            "Poll tick finished"
        );
        Ok(report)
    }

    /// Ticks until cancelled, pausing for the configured interval after each.
    ///
    /// A failed tick is logged and never ends the loop. Cancellation is
    /// observed at every suspension point.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(interval = ?self.config.interval, "Poller started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                result = self.tick() => {
                    if let Err(e) = result {
                        error!("Poll tick failed: {e}");
                    }
                }
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.interval) => {}
            }
        }
        info!("Poller stopped");
    }

    async fn complete(&self, session: &PendingSession, urls: &MeshUrls) {
        let avatar_id = session.avatar_id.as_str();
        info!(avatar_id, session_id = %session.session_id, "Model ready");

        let meshes = self.download_meshes(avatar_id, urls).await;
        let attached = self
            .store
            .attach_meshes(avatar_id, AvatarStatus::Rigging, meshes)
            .await;
        log_reconciliation("attach meshes", avatar_id, attached);

        let completed = self.store.complete_session(&session.session_id, urls).await;
        match log_reconciliation("complete session", avatar_id, completed) {
            Some(true) => {}
            Some(false) => {
                info!(
                    session_id = %session.session_id,
                    "Session no longer pending, skipping registration"
                );
                return;
            }
            None => return,
        }

        let registered = self.registration.register(avatar_id).await;
        log_reconciliation("register avatar", avatar_id, registered);
    }

    async fn download_meshes(&self, avatar_id: &str, urls: &MeshUrls) -> Vec<MeshAttachment> {
        let wanted = [
            (MeshFormat::Glb, urls.glb_url.as_deref()),
            (MeshFormat::Obj, urls.obj_url.as_deref()),
        ];

        let mut meshes = Vec::new();
        for (format, url) in wanted {
            let Some(url) = url else { continue };
            let downloaded = self.sessions.download(url).await;
            if let Some(bytes) = log_reconciliation("download mesh", avatar_id, downloaded) {
                debug!(avatar_id, field = format.field(), size = bytes.len(), "Mesh downloaded");
                meshes.push(MeshAttachment { format, bytes });
            }
        }
        meshes
    }
}
