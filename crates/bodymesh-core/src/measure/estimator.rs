//! Landmark-to-centimeter body measurement.

use tracing::debug;

use crate::domain::{BodyPoint, LandmarkSet, MeasurementRecord, View};
use crate::error::MeasureError;
use crate::quality::{QualityAssessor, QualityConfig};

use super::calibration::{validate_height, CalibrationConfig, ScaleCalibrator};
use super::waist::{WaistConfig, WaistEstimates, WeightHeuristic};

/// Inclusive bounds for one measurement. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ClampRange {
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Pulls a value into range. Out-of-range values are never rejected.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }

    /// Returns true if the value already lies within range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Plausible ranges used to contain detection noise.
#[derive(Debug, Clone)]
pub struct ClampConfig {
    pub shoulder_cm: ClampRange,
    pub torso_height_cm: ClampRange,
    pub side_depth_cm: ClampRange,
    pub hip_width_cm: ClampRange,
    pub arm_length_cm: ClampRange,
    pub leg_length_cm: ClampRange,
}

impl Default for ClampConfig {
    fn default() -> Self {
        Self {
            shoulder_cm: ClampRange::between(25.0, 45.0),
            torso_height_cm: ClampRange::between(20.0, 60.0),
            side_depth_cm: ClampRange::between(15.0, 35.0),
            hip_width_cm: ClampRange::between(20.0, 55.0),
            arm_length_cm: ClampRange::between(40.0, 90.0),
            leg_length_cm: ClampRange::between(50.0, 120.0),
        }
    }
}

/// Every tunable constant of the measurement engine.
#[derive(Debug, Clone, Default)]
pub struct EstimatorConfig {
    pub calibration: CalibrationConfig,
    pub clamps: ClampConfig,
    pub waist: WaistConfig,
    pub weight: WeightHeuristic,
    pub quality: QualityConfig,
}

/// Turns a front/side landmark pair into a [`MeasurementRecord`].
pub struct MeasurementEstimator {
    calibrator: ScaleCalibrator,
    clamps: ClampConfig,
    waist: WaistConfig,
    weight: WeightHeuristic,
    assessor: QualityAssessor,
}

impl MeasurementEstimator {
    #[must_use]
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            calibrator: ScaleCalibrator::new(config.calibration),
            clamps: config.clamps,
            waist: config.waist,
            weight: config.weight,
            assessor: QualityAssessor::new(config.quality),
        }
    }

    /// Estimates body measurements for a subject of known height.
    ///
    /// Each view is calibrated on its own against `height_cm`, so the two
    /// photographs may differ in resolution and framing.
    ///
    /// # Errors
    ///
    /// Returns an error if the height is invalid, a view has no landmarks or
    /// no pixels, or a landmark needed for a segment is missing.
    pub fn estimate(
        &self,
        front: &LandmarkSet,
        side: &LandmarkSet,
        height_cm: f64,
    ) -> Result<MeasurementRecord, MeasureError> {
        use BodyPoint::{
            LeftAnkle, LeftHip, LeftShoulder, LeftWrist, RightAnkle, RightHip, RightShoulder,
            RightWrist,
        };

        validate_height(height_cm)?;
        check_view(front, View::Front)?;
        check_view(side, View::Side)?;

        let front_cal = self.calibrator.calibrate(front, height_cm)?;
        let side_cal = self.calibrator.calibrate(side, height_cm)?;

        let shoulder_px = front.pixel_distance(LeftShoulder, RightShoulder)?;
        let torso_px = front.pixel_distance_between(
            front.midpoint(LeftShoulder, RightShoulder)?,
            front.midpoint(LeftHip, RightHip)?,
        );
        let hip_px = front.pixel_distance(LeftHip, RightHip)?;
        let arm_px = (front.pixel_distance(LeftShoulder, LeftWrist)?
            + front.pixel_distance(RightShoulder, RightWrist)?)
            / 2.0;
        let leg_px = (front.pixel_distance(LeftHip, LeftAnkle)?
            + front.pixel_distance(RightHip, RightAnkle)?)
            / 2.0;
        let depth_px = side.pixel_distance(LeftShoulder, LeftHip)?;

        let c = &self.clamps;
        let shoulder_cm = c.shoulder_cm.apply(front_cal.to_cm(shoulder_px));
        let torso_height_cm = c.torso_height_cm.apply(front_cal.to_cm(torso_px));
        let hip_width_cm = c.hip_width_cm.apply(front_cal.to_cm(hip_px));
        let arm_length_cm = c.arm_length_cm.apply(front_cal.to_cm(arm_px));
        let leg_length_cm = c.leg_length_cm.apply(front_cal.to_cm(leg_px));
        let side_depth_cm = c.side_depth_cm.apply(side_cal.to_cm(depth_px));

        let estimated_weight_kg = self
            .weight
            .estimate_kg(height_cm, shoulder_cm, side_depth_cm);
        let waist = WaistEstimates::compute(
            &self.waist,
            shoulder_cm,
            side_depth_cm,
            height_cm,
            estimated_weight_kg,
        );

        let quality = self.assessor.assess(front, side);
        debug!(
            shoulder_cm,
            side_depth_cm,
            waist_cm = waist.average,
            quality = ?quality.verdict,
            "Measurement estimated"
        );

        Ok(MeasurementRecord {
            height_cm,
            shoulder_cm,
            torso_height_cm,
            side_depth_cm,
            hip_width_cm,
            arm_length_cm,
            leg_length_cm,
            waist_width_cm: waist.width_cm,
            waist_circumference_geometric: waist.geometric,
            waist_circumference_regression: waist.regression,
            waist_circumference_simple: waist.simple,
            waist_circumference_average: waist.average,
            px_to_cm_scale: front_cal.scale,
            estimated_weight_kg,
            quality,
        })
    }
}

impl Default for MeasurementEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

fn check_view(set: &LandmarkSet, view: View) -> Result<(), MeasureError> {
    if set.is_empty() {
        return Err(MeasureError::NoLandmarks { view });
    }
    if set.width == 0 || set.height == 0 {
        return Err(MeasureError::EmptyImage { view });
    }
    Ok(())
}
