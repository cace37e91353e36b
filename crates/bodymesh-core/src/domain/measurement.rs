//! Measurement record and quality verdict types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BodyPoint, View};

/// Body measurements estimated from one front/side photo pair.
///
/// All lengths are in centimeters and lie within the estimator's clamp
/// ranges. `height_cm` echoes the input unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Subject height supplied with the upload.
    pub height_cm: f64,
    /// Left to right shoulder joint, front view.
    pub shoulder_cm: f64,
    /// Shoulder midpoint to hip midpoint, front view.
    pub torso_height_cm: f64,
    /// Shoulder to hip, side view.
    pub side_depth_cm: f64,
    /// Left to right hip joint, front view.
    pub hip_width_cm: f64,
    /// Shoulder to wrist, averaged over both arms.
    pub arm_length_cm: f64,
    /// Hip to ankle, averaged over both legs.
    pub leg_length_cm: f64,
    /// Waist cross-section width derived from the shoulders.
    pub waist_width_cm: f64,
    /// Elliptical waist circumference.
    pub waist_circumference_geometric: f64,
    /// Regression waist circumference.
    pub waist_circumference_regression: f64,
    /// Half-perimeter waist circumference.
    pub waist_circumference_simple: f64,
    /// Mean of the three waist circumference estimates.
    pub waist_circumference_average: f64,
    /// Centimeters per front-view pixel.
    pub px_to_cm_scale: f64,
    /// Heuristic body weight used by the regression estimate.
    pub estimated_weight_kg: f64,
    /// Advisory reliability verdict for the input landmarks.
    pub quality: QualityReport,
}

/// Overall reliability of a landmark pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityVerdict {
    /// No issues found.
    Excellent,
    /// One or two issues found.
    Good,
    /// Three or more issues found.
    Poor,
}

impl QualityVerdict {
    /// Maps an issue count to a verdict.
    #[must_use]
    pub const fn from_issue_count(count: usize) -> Self {
        match count {
            0 => Self::Excellent,
            1 | 2 => Self::Good,
            _ => Self::Poor,
        }
    }
}

/// A single problem found by a quality check.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QualityIssue {
    /// A key landmark was detected with low confidence.
    LowVisibility { view: View, point: BodyPoint },
    /// Legs are implausibly short relative to the torso.
    UnusualProportions,
    /// Left and right torso sides differ noticeably.
    Asymmetry,
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowVisibility {
                view: View::Front,
                point,
            } => write!(f, "low visibility: {point}"),
            Self::LowVisibility { view, point } => {
                write!(f, "low visibility: {point} ({view} view)")
            }
            Self::UnusualProportions => f.write_str("unusual body proportions"),
            Self::Asymmetry => f.write_str("asymmetry detected"),
        }
    }
}

/// Quality verdict plus the issues that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub verdict: QualityVerdict,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    /// Builds a report, deriving the verdict from the issue count.
    #[must_use]
    pub fn from_issues(issues: Vec<QualityIssue>) -> Self {
        Self {
            verdict: QualityVerdict::from_issue_count(issues.len()),
            issues,
        }
    }
}
