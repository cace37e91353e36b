//! Core domain types for body measurement and avatar reconstruction.

mod landmark;
mod measurement;
mod records;

pub use landmark::{BodyPoint, Landmark, LandmarkSet, Point2, View};
pub use measurement::{MeasurementRecord, QualityIssue, QualityReport, QualityVerdict};
pub use records::{
    AvatarRecord, AvatarStatus, ImageFile, MeshAttachment, MeshFormat, MeshUrls, NewAvatar,
    PendingSession, SessionStatus,
};
