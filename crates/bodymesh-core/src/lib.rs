//! Bodymesh Core - measurement engine and avatar session lifecycle
//!
//! This crate contains the domain types, the landmark-based measurement
//! engine with its quality checks, the port traits for external services,
//! and the async orchestration that creates avatars and reconciles their
//! reconstruction sessions.

pub mod domain;
pub mod error;
pub mod measure;
pub mod pipeline;
pub mod poller;
pub mod ports;
pub mod quality;
pub mod session;
pub mod supervisor;

pub use domain::{
    AvatarRecord, AvatarStatus, BodyPoint, ImageFile, Landmark, LandmarkSet, MeasurementRecord,
    MeshAttachment, MeshFormat, MeshUrls, NewAvatar, PendingSession, QualityIssue, QualityReport,
    QualityVerdict, SessionStatus, View,
};
pub use error::{log_reconciliation, MeasureError, PipelineError, UpstreamError};
pub use measure::{EstimatorConfig, MeasurementEstimator};
pub use pipeline::{AvatarPipeline, AvatarUpload, Collaborators, CreatedAvatar};
pub use poller::{Poller, PollerConfig, TickReport};
pub use ports::{
    BackgroundRemover, PoseDetector, ReconstructionService, RecordStore, RegistrationHook,
    RemoteSession, SizeAdvisor,
};
pub use session::{RetryPolicy, SessionCheck, SessionClient};
pub use supervisor::{ShutdownOutcome, Supervisor, SupervisorConfig};
