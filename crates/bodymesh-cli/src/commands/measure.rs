//! Measure command - estimate body measurements from landmark files.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bodymesh_core::domain::{Landmark, LandmarkSet, MeasurementRecord};
use bodymesh_core::MeasurementEstimator;
use clap::Args;
use serde::Deserialize;
use tracing::info;

use crate::config::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct MeasureArgs {
    /// Front-view landmark JSON
    #[arg(long, value_name = "FILE")]
    pub front: PathBuf,

    /// Side-view landmark JSON
    #[arg(long, value_name = "FILE")]
    pub side: PathBuf,

    /// Subject height in centimeters
    #[arg(long, value_name = "CM", allow_negative_numbers = true)]
    pub height: f64,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Accepted landmark file layouts.
///
/// Either a serialized [`LandmarkSet`] keyed by point name, or the pose
/// service's response with landmarks in detector index order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Named(LandmarkSet),
    Indexed {
        width: u32,
        height: u32,
        landmarks: Vec<Landmark>,
    },
}

impl From<LandmarkFile> for LandmarkSet {
    fn from(file: LandmarkFile) -> Self {
        match file {
            LandmarkFile::Named(set) => set,
            LandmarkFile::Indexed {
                width,
                height,
                landmarks,
            } => Self::from_indexed(width, height, &landmarks),
        }
    }
}

pub fn run(args: &MeasureArgs, config: &AppConfig) -> Result<()> {
    let front = read_landmarks(&args.front)?;
    let side = read_landmarks(&args.side)?;

    let estimator = MeasurementEstimator::new(config.estimator_config());
    let record = estimator
        .estimate(&front, &side, args.height)
        .context("Measurement failed")?;
    info!(
        waist_cm = record.waist_circumference_average,
        issues = record.quality.issues.len(),
        "Measured"
    );

    let pretty = args.pretty || config.output.pretty.unwrap_or(false);
    write_record(&mut std::io::stdout().lock(), &record, pretty)
}

fn read_landmarks(path: &Path) -> Result<LandmarkSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: LandmarkFile = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a landmark file", path.display()))?;
    Ok(file.into())
}

fn write_record(out: &mut impl Write, record: &MeasurementRecord, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bodymesh_core::domain::BodyPoint;

    #[test]
    fn test_indexed_layout_parses() {
        let file: LandmarkFile = serde_json::from_str(
            r#"{"width":640,"height":480,"landmarks":[{"x":0.5,"y":0.1,"visibility":0.9}]}"#,
        )
        .unwrap();
        let set = LandmarkSet::from(file);
        assert_eq!(set.width, 640);
        assert!(set.get(BodyPoint::Nose).is_ok());
    }

    #[test]
    fn test_named_layout_parses() {
        let file: LandmarkFile = serde_json::from_str(
            r#"{"width":640,"height":480,"points":{"left_ankle":{"x":0.4,"y":0.9,"visibility":0.8}}}"#,
        )
        .unwrap();
        let set = LandmarkSet::from(file);
        assert!(set.get(BodyPoint::LeftAnkle).is_ok());
    }

    #[test]
    fn test_unreadable_file_names_path() {
        let err = read_landmarks(Path::new("/nonexistent/front.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/front.json"));
    }
}
