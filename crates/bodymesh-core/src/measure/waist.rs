//! Waist circumference and body weight heuristics.
//!
//! No single landmark-derived proxy tracks waist girth well, so three
//! independent estimates are produced and averaged. The regression and
//! weight coefficients are uncalibrated placeholders.

use std::f64::consts::PI;

/// Linear model for the regression waist estimate.
#[derive(Debug, Clone)]
pub struct RegressionCoefficients {
    pub shoulder: f64,
    pub height: f64,
    pub weight: f64,
    pub intercept: f64,
}

impl Default for RegressionCoefficients {
    fn default() -> Self {
        Self {
            shoulder: 0.35,
            height: 0.25,
            weight: 0.4,
            intercept: -20.0,
        }
    }
}

/// BMI-anchored weight heuristic.
#[derive(Debug, Clone)]
pub struct WeightHeuristic {
    /// BMI assumed for a reference frame.
    pub bmi_anchor: f64,
    /// Shoulder width of the reference frame.
    pub reference_shoulder_cm: f64,
    /// Side depth of the reference frame.
    pub reference_depth_cm: f64,
    /// Share of the frame factor taken from shoulder width; the rest comes from depth.
    pub shoulder_share: f64,
    pub min_kg: f64,
    pub max_kg: f64,
}

impl Default for WeightHeuristic {
    fn default() -> Self {
        Self {
            bmi_anchor: 22.0,
            reference_shoulder_cm: 40.0,
            reference_depth_cm: 28.0,
            shoulder_share: 0.5,
            min_kg: 45.0,
            max_kg: 120.0,
        }
    }
}

impl WeightHeuristic {
    /// Estimates body weight in kilograms, clamped to `[min_kg, max_kg]`.
    ///
    /// Starts from the weight at the anchor BMI for this height and scales it
    /// by how broad and deep the frame is relative to the reference.
    #[must_use]
    pub fn estimate_kg(&self, height_cm: f64, shoulder_cm: f64, depth_cm: f64) -> f64 {
        let height_m = height_cm / 100.0;
        let anchor_kg = self.bmi_anchor * height_m * height_m;
        let frame = self.shoulder_share * (shoulder_cm / self.reference_shoulder_cm)
            + (1.0 - self.shoulder_share) * (depth_cm / self.reference_depth_cm);
        (anchor_kg * frame).clamp(self.min_kg, self.max_kg)
    }
}

/// Configuration for the waist estimates.
#[derive(Debug, Clone)]
pub struct WaistConfig {
    /// Waist width as a fraction of shoulder width.
    pub width_ratio: f64,
    /// Waist depth as a fraction of side depth.
    pub depth_ratio: f64,
    /// Upper bound applied to every circumference variant.
    pub max_circumference_cm: f64,
    pub regression: RegressionCoefficients,
}

impl Default for WaistConfig {
    fn default() -> Self {
        Self {
            width_ratio: 0.7,
            depth_ratio: 0.8,
            max_circumference_cm: 130.0,
            regression: RegressionCoefficients::default(),
        }
    }
}

/// The four waist circumference variants, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaistEstimates {
    /// Waist cross-section width.
    pub width_cm: f64,
    /// Waist cross-section depth.
    pub depth_cm: f64,
    pub geometric: f64,
    pub regression: f64,
    pub simple: f64,
    pub average: f64,
}

impl WaistEstimates {
    /// Computes every variant from already-clamped body measurements.
    #[must_use]
    pub fn compute(
        config: &WaistConfig,
        shoulder_cm: f64,
        side_depth_cm: f64,
        height_cm: f64,
        weight_kg: f64,
    ) -> Self {
        let width = shoulder_cm * config.width_ratio;
        let depth = side_depth_cm * config.depth_ratio;
        let cap = |v: f64| v.min(config.max_circumference_cm);

        // Width and depth are full axes, so this is Ramanujan's first
        // ellipse approximation written in diameters.
        let geometric = cap(PI * ((width * width + depth * depth) / 2.0).sqrt());

        let r = &config.regression;
        let regression = cap(
            r.shoulder * shoulder_cm + r.height * height_cm + r.weight * weight_kg + r.intercept,
        );

        let simple = cap((width + depth) * PI / 2.0);
        let average = cap((geometric + regression + simple) / 3.0);

        Self {
            width_cm: width,
            depth_cm: depth,
            geometric,
            regression,
            simple,
            average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_coefficients() {
        let r = RegressionCoefficients::default();
        assert!((r.shoulder - 0.35).abs() < f64::EPSILON);
        assert!((r.height - 0.25).abs() < f64::EPSILON);
        assert!((r.weight - 0.4).abs() < f64::EPSILON);
        assert!((r.intercept + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reference_frame_weight() {
        let w = WeightHeuristic::default().estimate_kg(170.0, 40.0, 28.0);
        // 22 * 1.7^2
        assert!((w - 63.58).abs() < 1e-9);
    }

    #[test]
    fn test_weight_is_clamped() {
        let h = WeightHeuristic::default();
        assert!((h.estimate_kg(120.0, 25.0, 15.0) - 45.0).abs() < f64::EPSILON);
        assert!((h.estimate_kg(220.0, 45.0, 35.0) - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_waist_variants() {
        let config = WaistConfig::default();
        let est = WaistEstimates::compute(&config, 40.0, 28.0, 170.0, 63.58);

        assert!((est.width_cm - 28.0).abs() < 1e-9);
        assert!((est.depth_cm - 22.4).abs() < 1e-9);

        let geometric = PI * ((28.0_f64.powi(2) + 22.4_f64.powi(2)) / 2.0).sqrt();
        assert!((est.geometric - geometric).abs() < 1e-9);

        let regression = 0.35 * 40.0 + 0.25 * 170.0 + 0.4 * 63.58 - 20.0;
        assert!((est.regression - regression).abs() < 1e-9);

        let simple = (28.0 + 22.4) * PI / 2.0;
        assert!((est.simple - simple).abs() < 1e-9);

        let average = (geometric + regression + simple) / 3.0;
        assert!((est.average - average).abs() < 1e-9);
    }

    #[test]
    fn test_variants_capped() {
        let config = WaistConfig {
            width_ratio: 5.0,
            depth_ratio: 5.0,
            ..WaistConfig::default()
        };
        let est = WaistEstimates::compute(&config, 45.0, 35.0, 250.0, 120.0);
        for v in [est.geometric, est.regression, est.simple, est.average] {
            assert!(v <= 130.0, "variant {v} exceeds cap");
        }
    }
}
