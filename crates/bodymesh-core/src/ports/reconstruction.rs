//! Remote multi-view 3D reconstruction.

use async_trait::async_trait;

use crate::domain::MeshUrls;
use crate::error::UpstreamError;

/// Raw state of a remote session, before readiness is decided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSession {
    /// Status string exactly as reported.
    pub status: String,
    /// One entry per output mesh, in response order.
    pub meshes: Vec<MeshUrls>,
}

/// Port for the reconstruction service.
///
/// Implementations make exactly one request per call. Retrying is the
/// caller's business.
#[async_trait]
pub trait ReconstructionService: Send + Sync {
    /// Starts a session from publicly fetchable image URLs and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Timeout`] on a read timeout and other
    /// variants for every other failure.
    async fn create_session(&self, image_urls: &[String]) -> Result<String, UpstreamError>;

    /// Fetches the current state of a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be parsed.
    async fn session_status(&self, session_id: &str) -> Result<RemoteSession, UpstreamError>;

    /// Downloads an output artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    async fn download(&self, url: &str) -> Result<Vec<u8>, UpstreamError>;
}
