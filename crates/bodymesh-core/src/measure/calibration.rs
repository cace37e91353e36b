//! Pixel-to-centimeter calibration from the subject's stated height.

use crate::domain::{BodyPoint, LandmarkSet};
use crate::error::MeasureError;

/// Configuration for scale calibration.
#[derive(Debug, Clone)]
pub struct CalibrationConfig {
    /// Distance from the eyes up to the crown, as a fraction of the
    /// eye-to-ankle span.
    pub head_top_offset: f64,
    /// Added to the pixel height so collapsed landmarks cannot divide by zero.
    pub epsilon: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            head_top_offset: 0.07,
            epsilon: 1e-6,
        }
    }
}

/// Result of calibrating one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Centimeters per pixel.
    pub scale: f64,
    /// Estimated crown-to-ankle height in pixels.
    pub pixel_height: f64,
}

impl Calibration {
    /// Converts a pixel length to centimeters.
    #[must_use]
    pub fn to_cm(&self, pixels: f64) -> f64 {
        pixels * self.scale
    }
}

/// Derives a scale factor from one known length: the subject's height.
#[derive(Debug, Clone, Default)]
pub struct ScaleCalibrator {
    config: CalibrationConfig,
}

impl ScaleCalibrator {
    #[must_use]
    pub const fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Calibrates a landmark set against a true height.
    ///
    /// The body is taken to span from the crown, estimated above the mean
    /// eye height, down to the mean ankle height.
    ///
    /// # Errors
    ///
    /// Returns an error if `height_cm` is not a positive finite number or if
    /// an eye or ankle landmark is missing.
    pub fn calibrate(
        &self,
        set: &LandmarkSet,
        height_cm: f64,
    ) -> Result<Calibration, MeasureError> {
        validate_height(height_cm)?;

        let eye_y = mean_y(set, BodyPoint::LeftEye, BodyPoint::RightEye)?;
        let ankle_y = mean_y(set, BodyPoint::LeftAnkle, BodyPoint::RightAnkle)?;

        let head_top_y = eye_y - self.config.head_top_offset * (ankle_y - eye_y);
        let pixel_height = (ankle_y - head_top_y).abs() * f64::from(set.height);
        let scale = height_cm / (pixel_height + self.config.epsilon);

        Ok(Calibration {
            scale,
            pixel_height,
        })
    }
}

/// Rejects heights that cannot anchor a scale.
///
/// # Errors
///
/// Returns [`MeasureError::InvalidHeight`] for zero, negative or non-finite values.
pub fn validate_height(height_cm: f64) -> Result<(), MeasureError> {
    if height_cm.is_finite() && height_cm > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::InvalidHeight(height_cm))
    }
}

fn mean_y(set: &LandmarkSet, a: BodyPoint, b: BodyPoint) -> Result<f64, MeasureError> {
    Ok((set.get(a)?.y + set.get(b)?.y) / 2.0)
}
