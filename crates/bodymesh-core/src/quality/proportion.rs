//! Leg-to-torso proportion check.

use crate::domain::{BodyPoint, QualityIssue};

use super::{QualityCheck, ViewPair};

/// Configuration for the proportion check.
#[derive(Debug, Clone)]
pub struct ProportionConfig {
    /// Minimum hip-to-ankle length as a multiple of shoulder-to-hip length.
    pub min_leg_to_torso: f64,
}

impl Default for ProportionConfig {
    fn default() -> Self {
        Self {
            min_leg_to_torso: 0.8,
        }
    }
}

/// Flags front views whose legs look too short for the torso.
///
/// Usually means the feet are cropped or the hips were misplaced.
#[derive(Debug, Clone, Default)]
pub struct ProportionCheck {
    config: ProportionConfig,
}

impl ProportionCheck {
    #[must_use]
    pub const fn new(config: ProportionConfig) -> Self {
        Self { config }
    }
}

impl QualityCheck for ProportionCheck {
    fn name(&self) -> &'static str {
        "proportion"
    }

    fn inspect(&self, views: &ViewPair<'_>) -> Vec<QualityIssue> {
        let front = views.front;
        let (Ok(shoulders), Ok(hips), Ok(ankles)) = (
            front.midpoint(BodyPoint::LeftShoulder, BodyPoint::RightShoulder),
            front.midpoint(BodyPoint::LeftHip, BodyPoint::RightHip),
            front.midpoint(BodyPoint::LeftAnkle, BodyPoint::RightAnkle),
        ) else {
            return vec![];
        };

        let shoulder_to_hip = shoulders.distance(hips);
        let hip_to_ankle = hips.distance(ankles);

        if hip_to_ankle < self.config.min_leg_to_torso * shoulder_to_hip {
            vec![QualityIssue::UnusualProportions]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::fixtures::{move_point, upright_figure};

    #[test]
    fn test_default_config() {
        let config = ProportionConfig::default();
        assert!((config.min_leg_to_torso - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normal_figure_passes() {
        let front = upright_figure();
        let issues = ProportionCheck::default().inspect(&ViewPair {
            front: &front,
            side: &front,
        });
        assert!(issues.is_empty());
    }

    #[test]
    fn test_short_legs_flagged() {
        let mut front = upright_figure();
        // Torso spans 0.30, legs only 0.15.
        move_point(&mut front, BodyPoint::LeftAnkle, 0.56, 0.70);
        move_point(&mut front, BodyPoint::RightAnkle, 0.44, 0.70);
        let issues = ProportionCheck::default().inspect(&ViewPair {
            front: &front,
            side: &front,
        });
        assert_eq!(issues, vec![QualityIssue::UnusualProportions]);
    }

    #[test]
    fn test_missing_points_report_nothing() {
        let mut front = upright_figure();
        front.points.remove(&BodyPoint::LeftAnkle);
        let issues = ProportionCheck::default().inspect(&ViewPair {
            front: &front,
            side: &front,
        });
        assert!(issues.is_empty());
    }
}
