//! Create command - run one avatar-creation task to completion.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bodymesh_core::domain::{ImageFile, MeasurementRecord};
use bodymesh_core::{AvatarPipeline, AvatarUpload, Collaborators, MeasurementEstimator};
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use super::wiring::{ServiceArgs, Wiring};
use crate::config::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Front photograph
    #[arg(long, value_name = "IMAGE")]
    pub front: PathBuf,

    /// Side photograph
    #[arg(long, value_name = "IMAGE")]
    pub side: PathBuf,

    /// Back photograph (stored, not measured)
    #[arg(long, value_name = "IMAGE")]
    pub back: PathBuf,

    /// Subject height in centimeters
    #[arg(long, value_name = "CM", allow_negative_numbers = true)]
    pub height: f64,

    /// Subject gender, stored with the avatar
    #[arg(long)]
    pub gender: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub services: ServiceArgs,
}

#[derive(Debug, Serialize)]
struct CreateSummary<'a> {
    avatar_id: &'a str,
    session_id: &'a str,
    created_at: String,
    measurements: &'a MeasurementRecord,
}

pub async fn run(args: &CreateArgs, config: &AppConfig) -> Result<()> {
    let upload = AvatarUpload {
        front: read_image(&args.front)?,
        side: read_image(&args.side)?,
        back: read_image(&args.back)?,
        height_cm: args.height,
        gender: args.gender.clone(),
    };

    let wiring = Wiring::new(&args.services, config)?;
    let services = Collaborators {
        store: wiring.store(),
        sessions: wiring.sessions()?,
        detector: wiring.detector()?,
        matting: wiring.matting(),
        sizing: wiring.sizing(),
    };
    let estimator = MeasurementEstimator::new(config.estimator_config());
    let pipeline = AvatarPipeline::new(services, estimator);

    let created = pipeline
        .create_entries(upload)
        .await
        .context("Avatar creation failed")?;
    info!(avatar_id = %created.avatar_id, session_id = %created.session_id, "Avatar created");

    let summary = CreateSummary {
        avatar_id: &created.avatar_id,
        session_id: &created.session_id,
        created_at: iso_timestamp(),
        measurements: &created.measurements,
    };
    let pretty = args.pretty || config.output.pretty.unwrap_or(false);
    let json = if pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    writeln!(std::io::stdout().lock(), "{json}")?;
    Ok(())
}

fn read_image(path: &Path) -> Result<ImageFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(ImageFile {
        content_type: content_type(path).to_string(),
        filename,
        bytes,
    })
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
