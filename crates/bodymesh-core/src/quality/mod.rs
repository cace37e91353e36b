//! Landmark quality assessment.
//!
//! Each check implements [`QualityCheck`] and looks for one kind of problem
//! in a front/side landmark pair. The [`QualityAssessor`] runs every check
//! and turns the combined issue count into a verdict. Verdicts are advisory:
//! they are attached to the measurement record and never block it.

mod proportion;
mod symmetry;
mod visibility;

pub use proportion::{ProportionCheck, ProportionConfig};
pub use symmetry::{SymmetryCheck, SymmetryConfig};
pub use visibility::{VisibilityCheck, VisibilityConfig};

use tracing::debug;

use crate::domain::{LandmarkSet, QualityIssue, QualityReport};

/// Front and side landmark sets for one subject.
#[derive(Debug, Clone, Copy)]
pub struct ViewPair<'a> {
    pub front: &'a LandmarkSet,
    pub side: &'a LandmarkSet,
}

/// A single rule applied to a landmark pair.
pub trait QualityCheck: Send + Sync {
    /// Returns the name of this check.
    fn name(&self) -> &'static str;

    /// Inspects the landmarks and returns any issues found.
    ///
    /// Missing landmarks are not errors here; checks that depend on them
    /// report nothing and leave the failure to the estimator.
    fn inspect(&self, views: &ViewPair<'_>) -> Vec<QualityIssue>;
}

/// Settings for the default set of checks.
#[derive(Debug, Clone, Default)]
pub struct QualityConfig {
    pub visibility: VisibilityConfig,
    pub proportion: ProportionConfig,
    pub symmetry: SymmetryConfig,
}

/// Runs a list of checks and derives a verdict.
pub struct QualityAssessor {
    checks: Vec<Box<dyn QualityCheck>>,
}

impl QualityAssessor {
    /// Creates an assessor with the visibility, proportion and symmetry checks.
    #[must_use]
    pub fn new(config: QualityConfig) -> Self {
        Self::with_checks(vec![
            Box::new(VisibilityCheck::new(config.visibility)),
            Box::new(ProportionCheck::new(config.proportion)),
            Box::new(SymmetryCheck::new(config.symmetry)),
        ])
    }

    /// Creates an assessor running exactly the given checks, in order.
    #[must_use]
    pub fn with_checks(checks: Vec<Box<dyn QualityCheck>>) -> Self {
        Self { checks }
    }

    /// Scores a landmark pair.
    #[must_use]
    pub fn assess(&self, front: &LandmarkSet, side: &LandmarkSet) -> QualityReport {
        let views = ViewPair { front, side };
        let mut issues = Vec::new();
        for check in &self.checks {
            let mut found = check.inspect(&views);
            if !found.is_empty() {
                debug!("Quality check {} found {} issue(s)", check.name(), found.len());
            }
            issues.append(&mut found);
        }
        QualityReport::from_issues(issues)
    }
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}
