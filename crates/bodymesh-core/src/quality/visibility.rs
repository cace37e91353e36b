//! Low-visibility detection for the landmarks the estimator relies on.

use crate::domain::{BodyPoint, LandmarkSet, QualityIssue, View};

use super::{QualityCheck, ViewPair};

/// Configuration for the visibility check.
#[derive(Debug, Clone)]
pub struct VisibilityConfig {
    /// Points below this visibility are flagged.
    pub min_visibility: f64,
    /// Front-view points that must be clearly visible.
    pub front_points: Vec<BodyPoint>,
    /// Side-view points that must be clearly visible.
    pub side_points: Vec<BodyPoint>,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            front_points: vec![
                BodyPoint::LeftShoulder,
                BodyPoint::RightShoulder,
                BodyPoint::LeftHip,
                BodyPoint::RightHip,
                BodyPoint::LeftAnkle,
                BodyPoint::RightAnkle,
            ],
            side_points: vec![BodyPoint::LeftShoulder, BodyPoint::LeftHip],
        }
    }
}

/// Flags key points that the detector was unsure about.
#[derive(Debug, Clone, Default)]
pub struct VisibilityCheck {
    config: VisibilityConfig,
}

impl VisibilityCheck {
    #[must_use]
    pub const fn new(config: VisibilityConfig) -> Self {
        Self { config }
    }

    fn scan(
        &self,
        set: &LandmarkSet,
        view: View,
        points: &[BodyPoint],
        out: &mut Vec<QualityIssue>,
    ) {
        for &point in points {
            // An undetected point is as bad as an invisible one.
            let visibility = set.points.get(&point).map_or(0.0, |l| l.visibility);
            if visibility < self.config.min_visibility {
                out.push(QualityIssue::LowVisibility { view, point });
            }
        }
    }
}

impl QualityCheck for VisibilityCheck {
    fn name(&self) -> &'static str {
        "visibility"
    }

    fn inspect(&self, views: &ViewPair<'_>) -> Vec<QualityIssue> {
        let mut issues = Vec::new();
        self.scan(views.front, View::Front, &self.config.front_points, &mut issues);
        self.scan(views.side, View::Side, &self.config.side_points, &mut issues);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::fixtures::{set_visibility, upright_figure};

    #[test]
    fn test_module_name() {
        assert_eq!(VisibilityCheck::default().name(), "visibility");
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut front = upright_figure();
        set_visibility(&mut front, BodyPoint::LeftHip, 0.5);
        let side = upright_figure();
        let issues = VisibilityCheck::default().inspect(&ViewPair {
            front: &front,
            side: &side,
        });
        assert!(issues.is_empty());

        set_visibility(&mut front, BodyPoint::LeftHip, 0.49);
        let issues = VisibilityCheck::default().inspect(&ViewPair {
            front: &front,
            side: &side,
        });
        assert_eq!(
            issues,
            vec![QualityIssue::LowVisibility {
                view: View::Front,
                point: BodyPoint::LeftHip
            }]
        );
    }

    #[test]
    fn test_missing_point_is_flagged() {
        let mut front = upright_figure();
        front.points.remove(&BodyPoint::RightShoulder);
        let side = upright_figure();
        let issues = VisibilityCheck::default().inspect(&ViewPair {
            front: &front,
            side: &side,
        });
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_side_view_points() {
        let front = upright_figure();
        let mut side = upright_figure();
        set_visibility(&mut side, BodyPoint::LeftShoulder, 0.2);
        // Not a side-view key point.
        set_visibility(&mut side, BodyPoint::RightAnkle, 0.2);
        let issues = VisibilityCheck::default().inspect(&ViewPair {
            front: &front,
            side: &side,
        });
        assert_eq!(
            issues,
            vec![QualityIssue::LowVisibility {
                view: View::Side,
                point: BodyPoint::LeftShoulder
            }]
        );
    }
}
