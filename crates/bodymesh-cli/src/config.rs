//! Configuration file support for bodymesh.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/bodymesh/config.toml` (lowest priority)
//! - Project-local: `.bodymesh.toml` (searched up directory tree)
//! - Environment variables and CLI flags (highest priority, applied by clap)

use std::path::{Path, PathBuf};
use std::time::Duration;

use bodymesh_core::measure::EstimatorConfig;
use bodymesh_core::{PollerConfig, RetryPolicy, SupervisorConfig};
use serde::Deserialize;
use tracing::{debug, info};

const PROJECT_FILE: &str = ".bodymesh.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoints of the external collaborators.
    pub services: ServicesConfig,
    /// Reconstruction session creation.
    pub session: SessionConfig,
    /// Background poller.
    pub poller: PollerSection,
    /// Advisory quality checks.
    pub quality: QualitySection,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// Service endpoints and credentials.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub record_store_url: Option<String>,
    pub reconstruction_url: Option<String>,
    pub reconstruction_api_key: Option<String>,
    pub register_url: Option<String>,
    pub size_url: Option<String>,
    pub pose_url: Option<String>,
    /// Background removal endpoint. Images pass through untouched when unset.
    pub matting_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_attempts: Option<u32>,
    pub retry_delay_secs: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PollerSection {
    pub interval_secs: Option<f64>,
    /// How long shutdown waits for the poller.
    pub grace_secs: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct QualitySection {
    /// Minimum landmark visibility (0.0-1.0).
    pub min_visibility: Option<f64>,
    pub min_leg_to_torso: Option<f64>,
    /// Largest left/right torso length difference, in normalized units.
    pub max_side_difference: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
}

/// Hardcoded fallbacks for values the config may leave unset.
pub mod defaults {
    pub const RECORD_STORE_URL: &str = "https://fittingroom.hatchwise.me";
    pub const RECONSTRUCTION_URL: &str = "https://api.csm.ai";
    pub const REGISTER_URL: &str = "https://register.hatchwise.me";
    pub const SIZE_URL: &str = "https://size.hatchwise.me";
    pub const TIMEOUT_SECS: u64 = 30;
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Missing files are silently ignored. Invalid values are reported as warnings.
    pub fn load() -> Self {
        let project = std::env::current_dir()
            .ok()
            .and_then(|cwd| find_config_in_parents(&cwd));
        Self::load_from(xdg_config_path().as_deref(), project.as_deref())
    }

    /// Load and merge the given files, the project file winning.
    pub fn load_from(xdg_path: Option<&Path>, project_path: Option<&Path>) -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_path {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = project_path {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Check values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        let s = &self.services;
        for (key, url) in [
            ("services.record_store_url", &s.record_store_url),
            ("services.reconstruction_url", &s.reconstruction_url),
            ("services.register_url", &s.register_url),
            ("services.size_url", &s.size_url),
            ("services.pose_url", &s.pose_url),
            ("services.matting_url", &s.matting_url),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(format!("{key} must be an http(s) URL, got '{url}'"));
                }
            }
        }
        if s.timeout_secs == Some(0) {
            return Err("services.timeout_secs must be positive".to_string());
        }

        if self.session.max_attempts == Some(0) {
            return Err("session.max_attempts must be at least 1".to_string());
        }
        for (key, secs) in [
            ("session.retry_delay_secs", self.session.retry_delay_secs),
            ("poller.interval_secs", self.poller.interval_secs),
            ("poller.grace_secs", self.poller.grace_secs),
        ] {
            if let Some(secs) = secs {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(format!("{key} must be a non-negative number, got {secs}"));
                }
            }
        }

        if let Some(v) = self.quality.min_visibility {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("quality.min_visibility must be 0.0-1.0, got {v}"));
            }
        }
        for (key, value) in [
            ("quality.min_leg_to_torso", self.quality.min_leg_to_torso),
            ("quality.max_side_difference", self.quality.max_side_difference),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{key} must be non-negative, got {v}"));
                }
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        let (s, o) = (&mut self.services, other.services);
        s.record_store_url = o.record_store_url.or_else(|| s.record_store_url.take());
        s.reconstruction_url = o.reconstruction_url.or_else(|| s.reconstruction_url.take());
        s.reconstruction_api_key = o
            .reconstruction_api_key
            .or_else(|| s.reconstruction_api_key.take());
        s.register_url = o.register_url.or_else(|| s.register_url.take());
        s.size_url = o.size_url.or_else(|| s.size_url.take());
        s.pose_url = o.pose_url.or_else(|| s.pose_url.take());
        s.matting_url = o.matting_url.or_else(|| s.matting_url.take());
        s.timeout_secs = o.timeout_secs.or(s.timeout_secs);

        self.session.max_attempts = other.session.max_attempts.or(self.session.max_attempts);
        self.session.retry_delay_secs = other
            .session
            .retry_delay_secs
            .or(self.session.retry_delay_secs);

        self.poller.interval_secs = other.poller.interval_secs.or(self.poller.interval_secs);
        self.poller.grace_secs = other.poller.grace_secs.or(self.poller.grace_secs);

        self.quality.min_visibility = other.quality.min_visibility.or(self.quality.min_visibility);
        self.quality.min_leg_to_torso = other
            .quality
            .min_leg_to_torso
            .or(self.quality.min_leg_to_torso);
        self.quality.max_side_difference = other
            .quality
            .max_side_difference
            .or(self.quality.max_side_difference);

        self.output.pretty = other.output.pretty.or(self.output.pretty);
    }

    /// Estimator settings with the quality overrides applied.
    pub fn estimator_config(&self) -> EstimatorConfig {
        let mut config = EstimatorConfig::default();
        let quality = &mut config.quality;
        if let Some(v) = self.quality.min_visibility {
            quality.visibility.min_visibility = v;
        }
        if let Some(v) = self.quality.min_leg_to_torso {
            quality.proportion.min_leg_to_torso = v;
        }
        if let Some(v) = self.quality.max_side_difference {
            quality.symmetry.max_side_difference = v;
        }
        config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let default = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.session.max_attempts.unwrap_or(default.max_attempts),
            delay: seconds(self.session.retry_delay_secs).unwrap_or(default.delay),
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: seconds(self.poller.interval_secs)
                .unwrap_or_else(|| PollerConfig::default().interval),
        }
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            grace: seconds(self.poller.grace_secs)
                .unwrap_or_else(|| SupervisorConfig::default().grace),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.services
                .timeout_secs
                .filter(|&t| t > 0)
                .unwrap_or(defaults::TIMEOUT_SECS),
        )
    }
}

/// Converts a configured number of seconds, ignoring values that failed validation.
fn seconds(value: Option<f64>) -> Option<Duration> {
    value.and_then(|s| Duration::try_from_secs_f64(s).ok())
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bodymesh").join("config.toml"))
}

/// Search for `.bodymesh.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
