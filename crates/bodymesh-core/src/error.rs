//! Error types shared by the measurement engine and the session lifecycle.

use thiserror::Error;
use tracing::warn;

use crate::domain::{BodyPoint, View};

/// Input problems that make a measurement impossible.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("height must be a positive number of centimeters, got {0}")]
    InvalidHeight(f64),
    #[error("no landmarks detected in {view} view")]
    NoLandmarks { view: View },
    #[error("{view} view has zero image dimensions")]
    EmptyImage { view: View },
    #[error("landmark {point} was not detected")]
    MissingLandmark { point: BodyPoint },
}

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("transport error talking to {url}: {message}")]
    Transport { url: String, message: String },
    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

impl UpstreamError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only read timeouts qualify; every other failure is surfaced at once.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Why an avatar-creation task stopped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("background removal failed for {image} image")]
    Preprocess {
        image: &'static str,
        #[source]
        source: UpstreamError,
    },
    #[error("pose detection failed for {view} view")]
    Detection {
        view: View,
        #[source]
        source: UpstreamError,
    },
    #[error("measurement failed")]
    Measurement(#[from] MeasureError),
    #[error("record store {operation} failed")]
    Store {
        operation: &'static str,
        #[source]
        source: UpstreamError,
    },
    #[error("reconstruction session for avatar {avatar_id} could not be created")]
    Reconstruction {
        avatar_id: String,
        #[source]
        source: UpstreamError,
    },
}

/// Logging boundary for best-effort store updates.
///
/// Reconciliation steps never abort the task or loop that runs them: a
/// failure is logged here and the store is left for the next tick to fix.
/// Returns the value on success.
pub fn log_reconciliation<T>(
    step: &str,
    avatar_id: &str,
    result: Result<T, UpstreamError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(avatar_id, step, "Reconciliation step failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_transient() {
        let timeout = UpstreamError::Timeout { url: "u".into() };
        let status = UpstreamError::Status {
            url: "u".into(),
            status: 503,
            body: String::new(),
        };
        let malformed = UpstreamError::Malformed {
            url: "u".into(),
            message: "eof".into(),
        };
        assert!(timeout.is_transient());
        assert!(!status.is_transient());
        assert!(!malformed.is_transient());
    }

    #[test]
    fn test_log_reconciliation_swallows_errors() {
        assert_eq!(log_reconciliation("step", "a1", Ok::<_, UpstreamError>(7)), Some(7));
        let failed: Result<(), _> = Err(UpstreamError::Transport {
            url: "u".into(),
            message: "connection refused".into(),
        });
        assert_eq!(log_reconciliation("step", "a1", failed), None);
    }

    #[test]
    fn test_error_messages() {
        let err = MeasureError::MissingLandmark {
            point: BodyPoint::LeftAnkle,
        };
        assert_eq!(err.to_string(), "landmark left_ankle was not detected");

        let err = MeasureError::NoLandmarks { view: View::Side };
        assert_eq!(err.to_string(), "no landmarks detected in side view");
    }
}
