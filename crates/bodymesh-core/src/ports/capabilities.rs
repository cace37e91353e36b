//! Narrow capabilities used while creating an avatar.

use async_trait::async_trait;

use crate::domain::{ImageFile, LandmarkSet};
use crate::error::UpstreamError;

/// Detects body landmarks in one photograph.
#[async_trait]
pub trait PoseDetector: Send + Sync {
    /// Returns the landmarks found in the image, possibly none.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or the detector fails.
    async fn detect(&self, image: &ImageFile) -> Result<LandmarkSet, UpstreamError>;
}

/// Cuts the subject out of a photograph.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Returns the subject on a transparent background as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be processed.
    async fn remove_background(&self, image: ImageFile) -> Result<ImageFile, UpstreamError>;
}

/// Recommends a garment size from a single photograph.
#[async_trait]
pub trait SizeAdvisor: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the service fails or returns no size.
    async fn recommend(&self, image: &ImageFile) -> Result<String, UpstreamError>;
}

/// Notifies the downstream fitting system that a mesh is available.
#[async_trait]
pub trait RegistrationHook: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the notification is not accepted.
    async fn register(&self, avatar_id: &str) -> Result<(), UpstreamError>;
}
