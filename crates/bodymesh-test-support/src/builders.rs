//! Synthetic landmark builders for testing.

use bodymesh_core::domain::{BodyPoint, Landmark, LandmarkSet};
use bodymesh_core::measure::CalibrationConfig;

const CENTER_X: f64 = 0.5;
const EYE_Y: f64 = 0.1;
const ANKLE_Y: f64 = 0.9;
const SHOULDER_Y: f64 = 0.25;

/// Builder for a standing figure whose segments measure known lengths.
///
/// Positions are worked backwards from the calibration rule, so a figure
/// built for `height_cm = 170` with `shoulder_cm = 40` measures 40 cm across
/// the shoulders (up to the calibration epsilon).
#[derive(Debug, Clone)]
pub struct LandmarkSetBuilder {
    width: u32,
    height: u32,
    height_cm: f64,
    shoulder_cm: f64,
    hip_cm: f64,
    torso_cm: f64,
    arm_cm: f64,
    side_depth_cm: f64,
    visibility: f64,
    head_top_offset: f64,
}

impl LandmarkSetBuilder {
    /// Starts a 170 cm figure on a 1000x1000 image.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 1000,
            height: 1000,
            height_cm: 170.0,
            shoulder_cm: 40.0,
            hip_cm: 32.0,
            torso_cm: 50.0,
            arm_cm: 60.0,
            side_depth_cm: 28.0,
            visibility: 0.95,
            head_top_offset: CalibrationConfig::default().head_top_offset,
        }
    }

    #[must_use]
    pub const fn image_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Height the figure is drawn for. Pass the same value to the estimator.
    #[must_use]
    pub const fn height_cm(mut self, cm: f64) -> Self {
        self.height_cm = cm;
        self
    }

    #[must_use]
    pub const fn shoulder_cm(mut self, cm: f64) -> Self {
        self.shoulder_cm = cm;
        self
    }

    #[must_use]
    pub const fn hip_cm(mut self, cm: f64) -> Self {
        self.hip_cm = cm;
        self
    }

    #[must_use]
    pub const fn torso_cm(mut self, cm: f64) -> Self {
        self.torso_cm = cm;
        self
    }

    #[must_use]
    pub const fn arm_cm(mut self, cm: f64) -> Self {
        self.arm_cm = cm;
        self
    }

    /// Shoulder-to-hip length in the side view.
    #[must_use]
    pub const fn side_depth_cm(mut self, cm: f64) -> Self {
        self.side_depth_cm = cm;
        self
    }

    /// Visibility given to every point.
    #[must_use]
    pub const fn visibility(mut self, v: f64) -> Self {
        self.visibility = v;
        self
    }

    /// Builds the front view.
    #[must_use]
    pub fn front(&self) -> LandmarkSet {
        let half_shoulder = self.dx(self.shoulder_cm) / 2.0;
        let half_hip = self.dx(self.hip_cm) / 2.0;
        let hip_y = SHOULDER_Y + self.dy(self.torso_cm);
        let wrist_y = SHOULDER_Y + self.dy(self.arm_cm);
        let elbow_y = (SHOULDER_Y + wrist_y) / 2.0;

        self.head().into_iter().chain([
            (BodyPoint::LeftShoulder, CENTER_X + half_shoulder, SHOULDER_Y),
            (BodyPoint::RightShoulder, CENTER_X - half_shoulder, SHOULDER_Y),
            (BodyPoint::LeftElbow, CENTER_X + half_shoulder, elbow_y),
            (BodyPoint::RightElbow, CENTER_X - half_shoulder, elbow_y),
            (BodyPoint::LeftWrist, CENTER_X + half_shoulder, wrist_y),
            (BodyPoint::RightWrist, CENTER_X - half_shoulder, wrist_y),
            (BodyPoint::LeftHip, CENTER_X + half_hip, hip_y),
            (BodyPoint::RightHip, CENTER_X - half_hip, hip_y),
            (BodyPoint::LeftAnkle, CENTER_X + half_hip, ANKLE_Y),
            (BodyPoint::RightAnkle, CENTER_X - half_hip, ANKLE_Y),
            (BodyPoint::LeftHeel, CENTER_X + half_hip, ANKLE_Y + 0.02),
            (BodyPoint::RightHeel, CENTER_X - half_hip, ANKLE_Y + 0.02),
        ])
        .fold(LandmarkSet::new(self.width, self.height), |set, (p, x, y)| {
            set.with(p, Landmark::new(x, y, self.visibility))
        })
    }

    /// Builds the side view, with both sides of the body overlapping.
    #[must_use]
    pub fn side(&self) -> LandmarkSet {
        let hip_y = SHOULDER_Y + self.dy(self.side_depth_cm);

        self.head().into_iter().chain([
            (BodyPoint::LeftShoulder, CENTER_X, SHOULDER_Y),
            (BodyPoint::RightShoulder, CENTER_X, SHOULDER_Y),
            (BodyPoint::LeftHip, CENTER_X, hip_y),
            (BodyPoint::RightHip, CENTER_X, hip_y),
            (BodyPoint::LeftAnkle, CENTER_X, ANKLE_Y),
            (BodyPoint::RightAnkle, CENTER_X, ANKLE_Y),
        ])
        .fold(LandmarkSet::new(self.width, self.height), |set, (p, x, y)| {
            set.with(p, Landmark::new(x, y, self.visibility))
        })
    }

    fn head(&self) -> [(BodyPoint, f64, f64); 3] {
        [
            (BodyPoint::Nose, CENTER_X, EYE_Y + 0.02),
            (BodyPoint::LeftEye, CENTER_X + 0.02, EYE_Y),
            (BodyPoint::RightEye, CENTER_X - 0.02, EYE_Y),
        ]
    }

    /// Pixels per centimeter implied by the calibration rule.
    fn px_per_cm(&self) -> f64 {
        let span = (ANKLE_Y - EYE_Y) * (1.0 + self.head_top_offset);
        span * f64::from(self.height) / self.height_cm
    }

    fn dx(&self, cm: f64) -> f64 {
        cm * self.px_per_cm() / f64::from(self.width)
    }

    fn dy(&self, cm: f64) -> f64 {
        cm * self.px_per_cm() / f64::from(self.height)
    }
}

impl Default for LandmarkSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_has_measured_points() {
        let set = LandmarkSetBuilder::new().front();
        for point in [
            BodyPoint::LeftEye,
            BodyPoint::RightEye,
            BodyPoint::LeftShoulder,
            BodyPoint::RightWrist,
            BodyPoint::LeftHip,
            BodyPoint::RightAnkle,
        ] {
            assert!(set.points.contains_key(&point), "missing {point}");
        }
    }

    #[test]
    fn test_shoulder_pixels_match_target() {
        let set = LandmarkSetBuilder::new().front();
        let px = set
            .pixel_distance(BodyPoint::LeftShoulder, BodyPoint::RightShoulder)
            .unwrap_or_default();
        // 0.8 * 1.07 * 1000 px span for 170 cm.
        let expected = 40.0 * 856.0 / 170.0;
        assert!((px - expected).abs() < 1e-6);
    }

    #[test]
    fn test_side_depth_pixels_match_target() {
        let set = LandmarkSetBuilder::new().side_depth_cm(30.0).side();
        let px = set
            .pixel_distance(BodyPoint::LeftShoulder, BodyPoint::LeftHip)
            .unwrap_or_default();
        assert!((px - 30.0 * 856.0 / 170.0).abs() < 1e-6);
    }
}
