//! Avatar creation tests against mock services.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;
use std::time::Duration;

use bodymesh_core::domain::{AvatarStatus, ImageFile, View};
use bodymesh_core::error::{MeasureError, PipelineError, UpstreamError};
use bodymesh_core::measure::MeasurementEstimator;
use bodymesh_core::pipeline::{AvatarPipeline, AvatarUpload, Collaborators};
use bodymesh_core::session::{RetryPolicy, SessionClient};
use bodymesh_test_support::{
    unreachable, LandmarkSetBuilder, MockBackgroundRemover, MockPoseDetector, MockReconstruction,
    MockRecordStore, MockSizeAdvisor,
};
use tokio::time::Instant;

struct Harness {
    store: MockRecordStore,
    recon: MockReconstruction,
    detector: MockPoseDetector,
    matting: MockBackgroundRemover,
    sizing: MockSizeAdvisor,
}

impl Harness {
    fn new() -> Self {
        let figure = LandmarkSetBuilder::new();
        Self {
            store: MockRecordStore::new(),
            recon: MockReconstruction::new(),
            detector: MockPoseDetector::new()
                .with_landmarks("front.jpg", figure.front())
                .with_landmarks("side.jpg", figure.side()),
            matting: MockBackgroundRemover::new(),
            sizing: MockSizeAdvisor::new("M"),
        }
    }

    fn pipeline(&self) -> AvatarPipeline {
        let retry = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        };
        AvatarPipeline::new(
            Collaborators {
                store: Arc::new(self.store.clone()),
                sessions: SessionClient::new(Arc::new(self.recon.clone()), retry),
                detector: Arc::new(self.detector.clone()),
                matting: Arc::new(self.matting.clone()),
                sizing: Arc::new(self.sizing.clone()),
            },
            MeasurementEstimator::default(),
        )
    }
}

fn upload(height_cm: f64) -> AvatarUpload {
    let jpeg = |name: &str| ImageFile {
        filename: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    };
    AvatarUpload {
        front: jpeg("front.jpg"),
        side: jpeg("side.jpg"),
        back: jpeg("back.jpg"),
        height_cm,
        gender: "female".to_string(),
    }
}

fn timeout() -> UpstreamError {
    UpstreamError::Timeout {
        url: "https://recon.test/v3/sessions/".to_string(),
    }
}

#[tokio::test]
async fn test_creates_avatar_and_pending_session() {
    let h = Harness::new();
    let created = h.pipeline().create_entries(upload(170.0)).await.unwrap();

    assert_eq!(created.avatar_id, "avatar-1");
    assert_eq!(created.session_id, "session-1");
    assert!((created.measurements.shoulder_cm - 40.0).abs() < 1e-4);

    let avatars = h.store.avatars();
    assert_eq!(avatars.len(), 1);
    assert_eq!(avatars[0].height_cm, 170.0);
    assert_eq!(avatars[0].gender, "female");
    assert_eq!(avatars[0].size_reco.as_deref(), Some("M"));
    assert_eq!(avatars[0].back.filename, "back.jpg");
    assert!(avatars[0].measurements.is_some());

    let sessions = h.store.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, "session-1");
    assert_eq!(sessions[0].avatar_id, "avatar-1");

    assert_eq!(
        h.recon.create_calls(),
        vec![vec![
            "https://store.test/api/files/Avatars/avatar-1/front.jpg".to_string(),
            "https://store.test/api/files/Avatars/avatar-1/side.jpg".to_string(),
        ]]
    );
    assert_eq!(h.matting.calls(), vec!["front.jpg", "side.jpg"]);
    assert!(h.store.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_mark_avatar_failed() {
    let mut h = Harness::new();
    h.recon = MockReconstruction::new()
        .then_create(Err(timeout()))
        .then_create(Err(timeout()))
        .then_create(Err(timeout()));
    let start = Instant::now();

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    match err {
        PipelineError::Reconstruction { avatar_id, source } => {
            assert_eq!(avatar_id, "avatar-1");
            assert_eq!(source, timeout());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.recon.create_calls().len(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(4));
    assert_eq!(h.store.avatar_status("avatar-1"), Some(AvatarStatus::Failed));
    assert!(h.store.sessions().is_empty());
}

#[tokio::test]
async fn test_rejected_request_fails_without_retry() {
    let mut h = Harness::new();
    h.recon = MockReconstruction::new().then_create(Err(UpstreamError::Status {
        url: "https://recon.test/v3/sessions/".to_string(),
        status: 401,
        body: "invalid api key".to_string(),
    }));

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Reconstruction { .. }));
    assert_eq!(h.recon.create_calls().len(), 1);
    assert_eq!(h.store.avatar_status("avatar-1"), Some(AvatarStatus::Failed));
}

#[tokio::test]
async fn test_session_persist_failure_marks_avatar_failed() {
    let mut h = Harness::new();
    h.store = MockRecordStore::new().failing_create_session(unreachable("https://store.test"));

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Store {
            operation: "create session",
            ..
        }
    ));
    assert_eq!(h.store.avatar_status("avatar-1"), Some(AvatarStatus::Failed));
}

#[tokio::test]
async fn test_store_failure_before_avatar_exists() {
    let mut h = Harness::new();
    h.store = MockRecordStore::new().failing_create_avatar(unreachable("https://store.test"));

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    match err {
        PipelineError::Store { operation, source } => {
            assert_eq!(operation, "create avatar");
            assert_eq!(source, unreachable("https://store.test"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.store.updates().is_empty());
    assert!(h.store.sessions().is_empty());
    assert!(h.recon.create_calls().is_empty());
}

#[tokio::test]
async fn test_failed_marking_still_returns_original_error() {
    let mut h = Harness::new();
    h.store = MockRecordStore::new().failing_updates(unreachable("https://store.test"));
    h.recon = MockReconstruction::new().then_create(Err(unreachable("https://recon.test")));

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Reconstruction { .. }));
    assert!(h.store.updates().is_empty());
}

#[tokio::test]
async fn test_no_landmarks_aborts_before_store() {
    let mut h = Harness::new();
    h.detector =
        MockPoseDetector::new().with_landmarks("front.jpg", LandmarkSetBuilder::new().front());

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Measurement(MeasureError::NoLandmarks { view: View::Side })
    ));
    assert!(h.store.avatars().is_empty());
    assert!(h.recon.create_calls().is_empty());
}

#[tokio::test]
async fn test_detection_failure_names_view() {
    let mut h = Harness::new();
    h.detector = MockPoseDetector::new().failing_for(
        "front.jpg",
        UpstreamError::Status {
            url: "https://pose.test/detect".to_string(),
            status: 422,
            body: "corrupt image".to_string(),
        },
    );

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Detection {
            view: View::Front,
            ..
        }
    ));
    assert!(h.store.avatars().is_empty());
}

#[tokio::test]
async fn test_invalid_height_fails_fast() {
    let h = Harness::new();
    let err = h.pipeline().create_entries(upload(0.0)).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Measurement(MeasureError::InvalidHeight(_))
    ));
    assert!(h.matting.calls().is_empty());
}

#[tokio::test]
async fn test_background_removal_failure() {
    let mut h = Harness::new();
    h.matting = MockBackgroundRemover::failing(unreachable("https://matting.test"));

    let err = h.pipeline().create_entries(upload(170.0)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Preprocess { image: "front", .. }));
}

#[tokio::test]
async fn test_size_failure_is_not_fatal() {
    let mut h = Harness::new();
    h.sizing = MockSizeAdvisor::failing(unreachable("https://size.test"));

    let created = h.pipeline().create_entries(upload(170.0)).await.unwrap();

    assert_eq!(created.avatar_id, "avatar-1");
    assert_eq!(h.store.avatars()[0].size_reco, None);
    assert_eq!(h.sizing.calls(), 1);
}

#[tokio::test]
async fn test_spawned_task_reports_failure() {
    let mut h = Harness::new();
    h.recon = MockReconstruction::new().then_create(Err(unreachable("https://recon.test")));

    let handle = h.pipeline().spawn(upload(170.0));
    let result = handle.await.expect("task does not panic");

    assert!(result.is_err());
    assert_eq!(h.store.avatar_status("avatar-1"), Some(AvatarStatus::Failed));
}

#[test]
fn test_session_client_debug_shows_retry_policy() {
    let client = SessionClient::new(Arc::new(MockReconstruction::new()), RetryPolicy::default());
    let debug = format!("{client:?}");
    assert!(debug.starts_with("SessionClient"));
    assert!(debug.contains("max_attempts: 3"));
}
