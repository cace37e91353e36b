//! Avatar creation: preprocessing, measurement, persistence and session start.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{AvatarRecord, AvatarStatus, ImageFile, MeasurementRecord, NewAvatar, View};
use crate::error::{log_reconciliation, PipelineError};
use crate::measure::{validate_height, MeasurementEstimator};
use crate::ports::{BackgroundRemover, PoseDetector, RecordStore, SizeAdvisor};
use crate::session::SessionClient;

/// Photographs and body data submitted for one avatar.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub front: ImageFile,
    pub side: ImageFile,
    /// Stored with the avatar, never measured.
    pub back: ImageFile,
    pub height_cm: f64,
    pub gender: String,
}

/// What a successful creation task leaves behind.
#[derive(Debug, Clone)]
pub struct CreatedAvatar {
    pub avatar_id: String,
    pub session_id: String,
    pub measurements: MeasurementRecord,
}

/// External services the pipeline depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn RecordStore>,
    pub sessions: SessionClient,
    pub detector: Arc<dyn PoseDetector>,
    pub matting: Arc<dyn BackgroundRemover>,
    pub sizing: Arc<dyn SizeAdvisor>,
}

/// Runs avatar-creation tasks. Cheap to clone; each clone shares the same
/// collaborators.
#[derive(Clone)]
pub struct AvatarPipeline {
    services: Collaborators,
    estimator: Arc<MeasurementEstimator>,
}

impl AvatarPipeline {
    #[must_use]
    pub fn new(services: Collaborators, estimator: MeasurementEstimator) -> Self {
        Self {
            services,
            estimator: Arc::new(estimator),
        }
    }

    /// Creates the avatar and its reconstruction session.
    ///
    /// Steps run in order: background removal, landmark detection,
    /// measurement, size recommendation, avatar creation, session creation,
    /// session persistence. Failures before the avatar exists leave nothing
    /// behind. Failures after it exists mark it `failed` and then return the
    /// original error.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage. A failed size recommendation is not
    /// an error; the avatar is stored without one.
    pub async fn create_entries(
        &self,
        upload: AvatarUpload,
    ) -> Result<CreatedAvatar, PipelineError> {
        let AvatarUpload {
            front,
            side,
            back,
            height_cm,
            gender,
        } = upload;
        validate_height(height_cm)?;

        let s = &self.services;
        let front = s
            .matting
            .remove_background(front)
            .await
            .map_err(|source| PipelineError::Preprocess {
                image: "front",
                source,
            })?;
        let side = s
            .matting
            .remove_background(side)
            .await
            .map_err(|source| PipelineError::Preprocess {
                image: "side",
                source,
            })?;

        let front_marks = s
            .detector
            .detect(&front)
            .await
            .map_err(|source| PipelineError::Detection {
                view: View::Front,
                source,
            })?;
        let side_marks = s
            .detector
            .detect(&side)
            .await
            .map_err(|source| PipelineError::Detection {
                view: View::Side,
                source,
            })?;

        let measurements = self.estimator.estimate(&front_marks, &side_marks, height_cm)?;
        info!(
            waist_cm = measurements.waist_circumference_average,
            quality = ?measurements.quality.verdict,
            "Measurements computed"
        );

        let size_reco = match s.sizing.recommend(&front).await {
            Ok(size) => Some(size),
            Err(e) => {
                warn!("Size recommendation unavailable: {e}");
                None
            }
        };

        let avatar = s
            .store
            .create_avatar(NewAvatar {
                height_cm,
                gender,
                size_reco,
                measurements: Some(measurements.clone()),
                front,
                side,
                back,
            })
            .await
            .map_err(|source| PipelineError::Store {
                operation: "create avatar",
                source,
            })?;
        info!(avatar_id = %avatar.id, "Avatar created");

        match self.start_session(&avatar).await {
            Ok(session_id) => Ok(CreatedAvatar {
                avatar_id: avatar.id,
                session_id,
                measurements,
            }),
            Err(err) => {
                let marked = s
                    .store
                    .update_avatar_status(&avatar.id, AvatarStatus::Failed)
                    .await;
                if log_reconciliation("mark avatar failed", &avatar.id, marked).is_some() {
                    info!(avatar_id = %avatar.id, "Avatar marked failed");
                }
                Err(err)
            }
        }
    }

    /// Runs [`create_entries`](Self::create_entries) as a detached task.
    ///
    /// The task logs its own failure. The handle may be dropped.
    pub fn spawn(&self, upload: AvatarUpload) -> JoinHandle<Result<CreatedAvatar, PipelineError>> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            let result = pipeline.create_entries(upload).await;
            if let Err(e) = &result {
                error!("Avatar creation failed: {}", error_chain(e));
            }
            result
        })
    }

    async fn start_session(&self, avatar: &AvatarRecord) -> Result<String, PipelineError> {
        let s = &self.services;
        let image_urls = [&avatar.front_view, &avatar.side_view]
            .into_iter()
            .map(|filename| s.store.image_url(&avatar.id, filename))
            .collect::<Vec<_>>();

        let session_id = s
            .sessions
            .create_session(&image_urls)
            .await
            .map_err(|source| PipelineError::Reconstruction {
                avatar_id: avatar.id.clone(),
                source,
            })?;

        s.store
            .create_session(&avatar.id, &session_id)
            .await
            .map_err(|source| PipelineError::Store {
                operation: "create session",
                source,
            })?;
        info!(avatar_id = %avatar.id, session_id = %session_id, "Session recorded");
        Ok(session_id)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MeasureError, UpstreamError};

    #[test]
    fn test_error_chain_includes_sources() {
        let err = PipelineError::Reconstruction {
            avatar_id: "a1".into(),
            source: UpstreamError::Timeout {
                url: "https://recon.test/v3/sessions/".into(),
            },
        };
        assert_eq!(
            error_chain(&err),
            "reconstruction session for avatar a1 could not be created: \
             request to https://recon.test/v3/sessions/ timed out"
        );
    }

    #[test]
    fn test_measurement_error_converts() {
        let err: PipelineError = MeasureError::InvalidHeight(-1.0).into();
        assert!(matches!(err, PipelineError::Measurement(_)));
    }
}
