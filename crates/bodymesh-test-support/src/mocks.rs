//! Mock implementations of core port traits.
//!
//! Every mock records its calls behind `Arc<Mutex<..>>` so clones handed to
//! the code under test can be inspected afterwards.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bodymesh_core::domain::{
    AvatarRecord, AvatarStatus, ImageFile, LandmarkSet, MeshAttachment, MeshUrls, NewAvatar,
    PendingSession, SessionStatus,
};
use bodymesh_core::error::UpstreamError;
use bodymesh_core::ports::{
    BackgroundRemover, PoseDetector, ReconstructionService, RecordStore, RegistrationHook,
    RemoteSession, SizeAdvisor,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A transport failure for scripting mocks.
#[must_use]
pub fn unreachable(url: &str) -> UpstreamError {
    UpstreamError::Transport {
        url: url.to_string(),
        message: "connection refused".to_string(),
    }
}

// === Record store ===

/// A session row as held by [`MockRecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub record_id: String,
    pub session_id: String,
    pub avatar_id: String,
    pub status: SessionStatus,
    pub meshes: Option<MeshUrls>,
}

/// An avatar update as seen by [`MockRecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpdate {
    pub avatar_id: String,
    pub status: AvatarStatus,
    pub meshes: Vec<MeshAttachment>,
}

#[derive(Default)]
struct StoreState {
    avatars: Vec<NewAvatar>,
    updates: Vec<AvatarUpdate>,
    sessions: Vec<SessionRow>,
    list_calls: usize,
    fail_create_avatar: Option<UpstreamError>,
    fail_create_session: Option<UpstreamError>,
    fail_list: Option<UpstreamError>,
    fail_updates: Option<UpstreamError>,
}

/// In-memory record store.
#[derive(Clone, Default)]
pub struct MockRecordStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockRecordStore {
    pub const BASE_URL: &'static str = "https://store.test";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a pending session.
    #[must_use]
    pub fn with_pending_session(self, session_id: &str, avatar_id: &str) -> Self {
        {
            let mut state = lock(&self.state);
            let record_id = format!("rec-{}", state.sessions.len() + 1);
            state.sessions.push(SessionRow {
                record_id,
                session_id: session_id.to_string(),
                avatar_id: avatar_id.to_string(),
                status: SessionStatus::Pending,
                meshes: None,
            });
        }
        self
    }

    /// Makes `create_avatar` fail.
    #[must_use]
    pub fn failing_create_avatar(self, err: UpstreamError) -> Self {
        lock(&self.state).fail_create_avatar = Some(err);
        self
    }

    /// Makes `create_session` fail.
    #[must_use]
    pub fn failing_create_session(self, err: UpstreamError) -> Self {
        lock(&self.state).fail_create_session = Some(err);
        self
    }

    /// Makes `list_pending_sessions` fail.
    #[must_use]
    pub fn failing_list(self, err: UpstreamError) -> Self {
        lock(&self.state).fail_list = Some(err);
        self
    }

    /// Makes every avatar update fail.
    #[must_use]
    pub fn failing_updates(self, err: UpstreamError) -> Self {
        lock(&self.state).fail_updates = Some(err);
        self
    }

    /// Avatars created so far, in order.
    #[must_use]
    pub fn avatars(&self) -> Vec<NewAvatar> {
        lock(&self.state).avatars.clone()
    }

    /// Avatar updates that were accepted, in order.
    #[must_use]
    pub fn updates(&self) -> Vec<AvatarUpdate> {
        lock(&self.state).updates.clone()
    }

    /// Latest status written to an avatar, if any.
    #[must_use]
    pub fn avatar_status(&self, avatar_id: &str) -> Option<AvatarStatus> {
        lock(&self.state)
            .updates
            .iter()
            .rev()
            .find(|u| u.avatar_id == avatar_id)
            .map(|u| u.status)
    }

    #[must_use]
    pub fn sessions(&self) -> Vec<SessionRow> {
        lock(&self.state).sessions.clone()
    }

    /// Number of times pending sessions were listed.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        lock(&self.state).list_calls
    }

    fn record_update(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
        meshes: Vec<MeshAttachment>,
    ) -> Result<(), UpstreamError> {
        let mut state = lock(&self.state);
        if let Some(err) = &state.fail_updates {
            return Err(err.clone());
        }
        state.updates.push(AvatarUpdate {
            avatar_id: avatar_id.to_string(),
            status,
            meshes,
        });
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn create_avatar(&self, avatar: NewAvatar) -> Result<AvatarRecord, UpstreamError> {
        let mut state = lock(&self.state);
        if let Some(err) = &state.fail_create_avatar {
            return Err(err.clone());
        }
        let record = AvatarRecord {
            id: format!("avatar-{}", state.avatars.len() + 1),
            front_view: avatar.front.filename.clone(),
            side_view: avatar.side.filename.clone(),
            back_view: avatar.back.filename.clone(),
        };
        state.avatars.push(avatar);
        Ok(record)
    }

    async fn update_avatar_status(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
    ) -> Result<(), UpstreamError> {
        self.record_update(avatar_id, status, Vec::new())
    }

    async fn attach_meshes(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
        meshes: Vec<MeshAttachment>,
    ) -> Result<(), UpstreamError> {
        self.record_update(avatar_id, status, meshes)
    }

    async fn create_session(&self, avatar_id: &str, session_id: &str) -> Result<(), UpstreamError> {
        let mut state = lock(&self.state);
        if let Some(err) = &state.fail_create_session {
            return Err(err.clone());
        }
        let record_id = format!("rec-{}", state.sessions.len() + 1);
        state.sessions.push(SessionRow {
            record_id,
            session_id: session_id.to_string(),
            avatar_id: avatar_id.to_string(),
            status: SessionStatus::Pending,
            meshes: None,
        });
        Ok(())
    }

    async fn list_pending_sessions(&self) -> Result<Vec<PendingSession>, UpstreamError> {
        let mut state = lock(&self.state);
        state.list_calls += 1;
        if let Some(err) = &state.fail_list {
            return Err(err.clone());
        }
        Ok(state
            .sessions
            .iter()
            .filter(|row| row.status == SessionStatus::Pending)
            .map(|row| PendingSession {
                record_id: row.record_id.clone(),
                session_id: row.session_id.clone(),
                avatar_id: row.avatar_id.clone(),
            })
            .collect())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        meshes: &MeshUrls,
    ) -> Result<bool, UpstreamError> {
        let mut state = lock(&self.state);
        let row = state
            .sessions
            .iter_mut()
            .find(|row| row.session_id == session_id && row.status == SessionStatus::Pending);
        Ok(row.map_or(false, |row| {
            row.status = SessionStatus::Complete;
            row.meshes = Some(meshes.clone());
            true
        }))
    }

    fn image_url(&self, avatar_id: &str, filename: &str) -> String {
        format!("{}/api/files/Avatars/{avatar_id}/{filename}", Self::BASE_URL)
    }
}

// === Reconstruction service ===

#[derive(Default)]
struct ReconstructionState {
    create_script: VecDeque<Result<String, UpstreamError>>,
    create_calls: Vec<Vec<String>>,
    statuses: HashMap<String, Result<RemoteSession, UpstreamError>>,
    status_calls: Vec<String>,
    downloads: HashMap<String, Result<Vec<u8>, UpstreamError>>,
    download_calls: Vec<String>,
}

/// Scripted reconstruction service.
///
/// `create_session` pops scripted results in order and answers
/// `session-1` once the script is empty. Unknown sessions report `pending`.
/// Unscripted downloads return the URL's bytes.
#[derive(Clone, Default)]
pub struct MockReconstruction {
    state: Arc<Mutex<ReconstructionState>>,
}

impl MockReconstruction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a result for the next `create_session` call.
    #[must_use]
    pub fn then_create(self, result: Result<String, UpstreamError>) -> Self {
        lock(&self.state).create_script.push_back(result);
        self
    }

    /// Sets the response for a session's status checks.
    #[must_use]
    pub fn with_status(
        self,
        session_id: &str,
        result: Result<RemoteSession, UpstreamError>,
    ) -> Self {
        lock(&self.state)
            .statuses
            .insert(session_id.to_string(), result);
        self
    }

    /// Reports a session as complete with the given mesh URLs.
    #[must_use]
    pub fn with_complete(self, session_id: &str, glb: Option<&str>, obj: Option<&str>) -> Self {
        self.with_status(
            session_id,
            Ok(RemoteSession {
                status: "complete".to_string(),
                meshes: vec![MeshUrls {
                    glb_url: glb.map(String::from),
                    obj_url: obj.map(String::from),
                }],
            }),
        )
    }

    /// Sets the response for a download URL.
    #[must_use]
    pub fn with_download(self, url: &str, result: Result<Vec<u8>, UpstreamError>) -> Self {
        lock(&self.state)
            .downloads
            .insert(url.to_string(), result);
        self
    }

    /// Image URL lists passed to `create_session`, one per call.
    #[must_use]
    pub fn create_calls(&self) -> Vec<Vec<String>> {
        lock(&self.state).create_calls.clone()
    }

    /// Session ids passed to `session_status`, in order.
    #[must_use]
    pub fn status_calls(&self) -> Vec<String> {
        lock(&self.state).status_calls.clone()
    }

    /// URLs passed to `download`, in order.
    #[must_use]
    pub fn download_calls(&self) -> Vec<String> {
        lock(&self.state).download_calls.clone()
    }
}

#[async_trait]
impl ReconstructionService for MockReconstruction {
    async fn create_session(&self, image_urls: &[String]) -> Result<String, UpstreamError> {
        let mut state = lock(&self.state);
        state.create_calls.push(image_urls.to_vec());
        state
            .create_script
            .pop_front()
            .unwrap_or_else(|| Ok("session-1".to_string()))
    }

    async fn session_status(&self, session_id: &str) -> Result<RemoteSession, UpstreamError> {
        let mut state = lock(&self.state);
        state.status_calls.push(session_id.to_string());
        state.statuses.get(session_id).cloned().unwrap_or_else(|| {
            Ok(RemoteSession {
                status: "pending".to_string(),
                meshes: Vec::new(),
            })
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, UpstreamError> {
        let mut state = lock(&self.state);
        state.download_calls.push(url.to_string());
        state
            .downloads
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(url.as_bytes().to_vec()))
    }
}

// === Capabilities ===

/// Pose detector answering from a filename-keyed table.
#[derive(Clone, Default)]
pub struct MockPoseDetector {
    results: Arc<Mutex<HashMap<String, Result<LandmarkSet, UpstreamError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPoseDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the landmarks reported for an image filename.
    #[must_use]
    pub fn with_landmarks(self, filename: &str, set: LandmarkSet) -> Self {
        lock(&self.results).insert(filename.to_string(), Ok(set));
        self
    }

    /// Makes detection fail for an image filename.
    #[must_use]
    pub fn failing_for(self, filename: &str, err: UpstreamError) -> Self {
        lock(&self.results).insert(filename.to_string(), Err(err));
        self
    }

    /// Filenames passed to `detect`, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PoseDetector for MockPoseDetector {
    async fn detect(&self, image: &ImageFile) -> Result<LandmarkSet, UpstreamError> {
        lock(&self.calls).push(image.filename.clone());
        lock(&self.results)
            .get(&image.filename)
            .cloned()
            .unwrap_or_else(|| Ok(LandmarkSet::new(1000, 1000)))
    }
}

/// Background remover that returns its input unchanged.
#[derive(Clone, Default)]
pub struct MockBackgroundRemover {
    fail_with: Option<UpstreamError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBackgroundRemover {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(err: UpstreamError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    /// Filenames processed, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl BackgroundRemover for MockBackgroundRemover {
    async fn remove_background(&self, image: ImageFile) -> Result<ImageFile, UpstreamError> {
        lock(&self.calls).push(image.filename.clone());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(image),
        }
    }
}

/// Size advisor with a fixed answer.
#[derive(Clone)]
pub struct MockSizeAdvisor {
    answer: Result<String, UpstreamError>,
    calls: Arc<Mutex<usize>>,
}

impl MockSizeAdvisor {
    #[must_use]
    pub fn new(size: &str) -> Self {
        Self {
            answer: Ok(size.to_string()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    #[must_use]
    pub fn failing(err: UpstreamError) -> Self {
        Self {
            answer: Err(err),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }
}

impl Default for MockSizeAdvisor {
    fn default() -> Self {
        Self::new("M")
    }
}

#[async_trait]
impl SizeAdvisor for MockSizeAdvisor {
    async fn recommend(&self, _image: &ImageFile) -> Result<String, UpstreamError> {
        *lock(&self.calls) += 1;
        self.answer.clone()
    }
}

/// Registration hook that records the avatars it was told about.
#[derive(Clone, Default)]
pub struct MockRegistration {
    fail_with: Option<UpstreamError>,
    registered: Arc<Mutex<Vec<String>>>,
}

impl MockRegistration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(err: UpstreamError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    /// Avatar ids passed to `register`, including failed attempts.
    #[must_use]
    pub fn registered(&self) -> Vec<String> {
        lock(&self.registered).clone()
    }
}

#[async_trait]
impl RegistrationHook for MockRegistration {
    async fn register(&self, avatar_id: &str) -> Result<(), UpstreamError> {
        lock(&self.registered).push(avatar_id.to_string());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_session_is_conditional() {
        let store = MockRecordStore::new().with_pending_session("s1", "a1");
        let urls = MeshUrls {
            glb_url: Some("https://cdn/a.glb".into()),
            obj_url: None,
        };
        assert!(store.complete_session("s1", &urls).await.unwrap());
        assert!(!store.complete_session("s1", &urls).await.unwrap());
        assert!(store.list_pending_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconstruction_script_then_default() {
        let recon = MockReconstruction::new().then_create(Err(UpstreamError::Timeout {
            url: "u".into(),
        }));
        assert!(recon.create_session(&[]).await.is_err());
        assert_eq!(recon.create_session(&[]).await.unwrap(), "session-1");
        assert_eq!(recon.create_calls().len(), 2);
    }
}
