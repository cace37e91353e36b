//! Adapters for the single-purpose image and callback services.

use std::path::Path;

use async_trait::async_trait;
use bodymesh_core::domain::{ImageFile, Landmark, LandmarkSet};
use bodymesh_core::error::UpstreamError;
use bodymesh_core::ports::{BackgroundRemover, PoseDetector, RegistrationHook, SizeAdvisor};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::{join, read_bytes, read_json, request_error};

fn file_form(image: &ImageFile) -> Result<Form, reqwest::Error> {
    let part = Part::bytes(image.bytes.clone())
        .file_name(image.filename.clone())
        .mime_str(&image.content_type)?;
    Ok(Form::new().part("file", part))
}

async fn post_file(
    client: &Client,
    url: &str,
    image: &ImageFile,
) -> Result<reqwest::Response, UpstreamError> {
    let form = file_form(image).map_err(|e| request_error(url, &e))?;
    client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| request_error(url, &e))
}

// === Pose detection ===

#[derive(Debug, Deserialize)]
struct PoseResponse {
    width: u32,
    height: u32,
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

/// Pose detector served over HTTP.
///
/// The service answers with the image size and the 33 landmarks in detector
/// index order, or an empty list when no person was found.
#[derive(Debug, Clone)]
pub struct HttpPoseDetector {
    client: Client,
    url: String,
}

impl HttpPoseDetector {
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PoseDetector for HttpPoseDetector {
    async fn detect(&self, image: &ImageFile) -> Result<LandmarkSet, UpstreamError> {
        let response = post_file(&self.client, &self.url, image).await?;
        let body: PoseResponse = read_json(&self.url, response).await?;
        debug!(
            image = %image.filename,
            landmarks = body.landmarks.len(),
            "Pose detected"
        );
        Ok(LandmarkSet::from_indexed(body.width, body.height, &body.landmarks))
    }
}

// === Background removal ===

/// Background removal served over HTTP. The response body is the cut-out PNG.
#[derive(Debug, Clone)]
pub struct HttpBackgroundRemover {
    client: Client,
    url: String,
}

impl HttpBackgroundRemover {
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BackgroundRemover for HttpBackgroundRemover {
    async fn remove_background(&self, image: ImageFile) -> Result<ImageFile, UpstreamError> {
        let response = post_file(&self.client, &self.url, &image).await?;
        let bytes = read_bytes(&self.url, response).await?;
        Ok(ImageFile::png(png_name(&image.filename), bytes))
    }
}

/// Returns every image unchanged. Used when no matting service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughBackgroundRemover;

#[async_trait]
impl BackgroundRemover for PassthroughBackgroundRemover {
    async fn remove_background(&self, image: ImageFile) -> Result<ImageFile, UpstreamError> {
        Ok(image)
    }
}

fn png_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}.png")
}

// === Size recommendation ===

#[derive(Debug, Deserialize)]
struct SizeResponse {
    size: Option<String>,
}

/// Client for the size recommendation service's `/analyze-image`.
#[derive(Debug, Clone)]
pub struct HttpSizeAdvisor {
    client: Client,
    base_url: String,
}

impl HttpSizeAdvisor {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SizeAdvisor for HttpSizeAdvisor {
    async fn recommend(&self, image: &ImageFile) -> Result<String, UpstreamError> {
        let url = join(&self.base_url, "analyze-image");
        let response = post_file(&self.client, &url, image).await?;
        let body: SizeResponse = read_json(&url, response).await?;
        body.size.ok_or_else(|| UpstreamError::Malformed {
            url,
            message: "response has no size".to_string(),
        })
    }
}

// === Registration ===

/// Client for the fitting system's `/register-and-fit` callback.
#[derive(Debug, Clone)]
pub struct HttpRegistration {
    client: Client,
    base_url: String,
}

impl HttpRegistration {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RegistrationHook for HttpRegistration {
    async fn register(&self, avatar_id: &str) -> Result<(), UpstreamError> {
        let url = join(&self.base_url, "register-and-fit");
        let response = self
            .client
            .post(&url)
            .form(&[("avatar_id", avatar_id)])
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        read_bytes(&url, response).await?;
        info!(avatar_id, "Avatar registered for fitting");
        Ok(())
    }
}
