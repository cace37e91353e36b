//! Left/right torso symmetry check.

use crate::domain::{BodyPoint, QualityIssue};

use super::{QualityCheck, ViewPair};

/// Configuration for the symmetry check.
#[derive(Debug, Clone)]
pub struct SymmetryConfig {
    /// Largest allowed difference between the left and right
    /// shoulder-to-hip lengths, in normalized image units.
    pub max_side_difference: f64,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            max_side_difference: 0.1,
        }
    }
}

/// Flags a front view where one side of the torso is much longer.
#[derive(Debug, Clone, Default)]
pub struct SymmetryCheck {
    config: SymmetryConfig,
}

impl SymmetryCheck {
    #[must_use]
    pub const fn new(config: SymmetryConfig) -> Self {
        Self { config }
    }
}

impl QualityCheck for SymmetryCheck {
    fn name(&self) -> &'static str {
        "symmetry"
    }

    fn inspect(&self, views: &ViewPair<'_>) -> Vec<QualityIssue> {
        let front = views.front;
        let (Ok(left), Ok(right)) = (
            front.normalized_distance(BodyPoint::LeftShoulder, BodyPoint::LeftHip),
            front.normalized_distance(BodyPoint::RightShoulder, BodyPoint::RightHip),
        ) else {
            return vec![];
        };

        if (left - right).abs() > self.config.max_side_difference {
            vec![QualityIssue::Asymmetry]
        } else {
            vec![]
        }
    }
}
