//! Session creation and readiness checks against the reconstruction service.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::MeshUrls;
use crate::error::UpstreamError;
use crate::ports::{ReconstructionService, RemoteSession};

use super::RetryPolicy;

/// Remote status string that marks a finished session.
const COMPLETE: &str = "complete";

/// Outcome of a single readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    /// The session finished and produced at least one mesh URL.
    Ready(MeshUrls),
    /// Still running, or finished without usable output.
    NotReady { status: String },
}

impl SessionCheck {
    /// Decides readiness from a raw remote session.
    ///
    /// Ready only if the status is exactly `complete` and a mesh entry carries
    /// a non-empty URL. Only the URLs actually present are kept.
    #[must_use]
    pub fn from_remote(remote: RemoteSession) -> Self {
        if remote.status != COMPLETE {
            return Self::NotReady {
                status: remote.status,
            };
        }

        remote
            .meshes
            .into_iter()
            .map(|mesh| MeshUrls {
                glb_url: mesh.glb_url.filter(|u| !u.is_empty()),
                obj_url: mesh.obj_url.filter(|u| !u.is_empty()),
            })
            .find(|urls| !urls.is_empty())
            .map_or_else(
                || Self::NotReady {
                    status: remote.status,
                },
                Self::Ready,
            )
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Creates and checks reconstruction sessions.
#[derive(Clone)]
pub struct SessionClient {
    service: Arc<dyn ReconstructionService>,
    retry: RetryPolicy,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    #[must_use]
    pub fn new(service: Arc<dyn ReconstructionService>, retry: RetryPolicy) -> Self {
        Self { service, retry }
    }

    /// Starts a session, retrying read timeouts according to the policy.
    ///
    /// # Errors
    ///
    /// Returns the last timeout once attempts are exhausted, or any other
    /// failure immediately.
    pub async fn create_session(&self, image_urls: &[String]) -> Result<String, UpstreamError> {
        let session_id = self
            .retry
            .run(|| self.service.create_session(image_urls))
            .await?;
        info!(session_id = %session_id, "Reconstruction session created");
        Ok(session_id)
    }

    /// Checks a session once, without retrying.
    ///
    /// # Errors
    ///
    /// Returns an error if the status request itself fails. A session that is
    /// merely unfinished is not an error.
    pub async fn check_session(&self, session_id: &str) -> Result<SessionCheck, UpstreamError> {
        let remote = self.service.session_status(session_id).await?;
        let check = SessionCheck::from_remote(remote);
        debug!(session_id, ready = check.is_ready(), "Session checked");
        Ok(check)
    }

    /// Downloads a finished artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, UpstreamError> {
        self.service.download(url).await
    }
}
