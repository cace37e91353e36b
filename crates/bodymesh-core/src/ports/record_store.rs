//! Durable storage for avatars and reconstruction sessions.

use async_trait::async_trait;

use crate::domain::{
    AvatarRecord, AvatarStatus, MeshAttachment, MeshUrls, NewAvatar, PendingSession,
};
use crate::error::UpstreamError;

/// Port for the external record store.
///
/// All lifecycle state lives behind this trait; nothing is cached in process.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates an avatar in `modeling` status with its three images.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the record or cannot be reached.
    async fn create_avatar(&self, avatar: NewAvatar) -> Result<AvatarRecord, UpstreamError>;

    /// Sets an avatar's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is not accepted.
    async fn update_avatar_status(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
    ) -> Result<(), UpstreamError>;

    /// Sets an avatar's status and attaches mesh files in the same update.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is not accepted.
    async fn attach_meshes(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
        meshes: Vec<MeshAttachment>,
    ) -> Result<(), UpstreamError>;

    /// Records a new `pending` session for an avatar.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be created.
    async fn create_session(&self, avatar_id: &str, session_id: &str) -> Result<(), UpstreamError>;

    /// Lists every session still in `pending` status.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails or is malformed.
    async fn list_pending_sessions(&self) -> Result<Vec<PendingSession>, UpstreamError>;

    /// Marks a session `complete` and stores its mesh URLs.
    ///
    /// The write only applies to a record that is still `pending`. Returns
    /// `false` when no such record exists, which means another writer got
    /// there first.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the update fails.
    async fn complete_session(
        &self,
        session_id: &str,
        meshes: &MeshUrls,
    ) -> Result<bool, UpstreamError>;

    /// Public URL of a file stored on an avatar.
    fn image_url(&self, avatar_id: &str, filename: &str) -> String;
}
