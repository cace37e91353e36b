//! Measurement engine: calibration, segment estimation and waist variants.

mod calibration;
mod estimator;
mod waist;

pub use calibration::{validate_height, Calibration, CalibrationConfig, ScaleCalibrator};
pub use estimator::{ClampConfig, ClampRange, EstimatorConfig, MeasurementEstimator};
pub use waist::{RegressionCoefficients, WaistConfig, WaistEstimates, WeightHeuristic};
