//! Reconstruction service adapter for the CSM multiview-to-3D API.

use async_trait::async_trait;
use bodymesh_core::domain::MeshUrls;
use bodymesh_core::error::UpstreamError;
use bodymesh_core::ports::{ReconstructionService, RemoteSession};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{join, read_bytes, read_json, request_error};

const API_KEY_HEADER: &str = "x-api-key";

/// Client for `/v3/sessions`.
#[derive(Debug, Clone)]
pub struct CsmReconstruction {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    input: CreateInput<'a>,
}

#[derive(Debug, Serialize)]
struct CreateInput<'a> {
    images: &'a [String],
    model: &'static str,
    settings: Settings,
}

#[derive(Debug, Serialize)]
struct Settings {
    geometry_model: &'static str,
}

#[derive(Debug, Deserialize)]
struct Created {
    #[serde(rename = "_id")]
    id: String,
}

/// Session as reported while it runs. Sections not produced yet may be
/// absent or `null`.
#[derive(Debug, Default, Deserialize)]
struct SessionBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Option<Output>,
}

#[derive(Debug, Default, Deserialize)]
struct Output {
    #[serde(default)]
    meshes: Option<Vec<Mesh>>,
}

#[derive(Debug, Default, Deserialize)]
struct Mesh {
    #[serde(default)]
    data: Option<MeshUrls>,
}

impl From<SessionBody> for RemoteSession {
    fn from(body: SessionBody) -> Self {
        let meshes = body
            .output
            .and_then(|output| output.meshes)
            .unwrap_or_default()
            .into_iter()
            .map(|mesh| mesh.data.unwrap_or_default())
            .collect();
        Self {
            status: body.status.unwrap_or_default(),
            meshes,
        }
    }
}

fn create_request(image_urls: &[String]) -> CreateRequest<'_> {
    CreateRequest {
        kind: "multiview_to_3d",
        input: CreateInput {
            images: image_urls,
            model: "sculpt",
            settings: Settings {
                geometry_model: "base",
            },
        },
    }
}

impl CsmReconstruction {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn sessions_url(&self) -> String {
        join(&self.base_url, "v3/sessions/")
    }
}

#[async_trait]
impl ReconstructionService for CsmReconstruction {
    async fn create_session(&self, image_urls: &[String]) -> Result<String, UpstreamError> {
        let url = self.sessions_url();
        debug!(images = image_urls.len(), "Creating reconstruction session");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&create_request(image_urls))
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        let created: Created = read_json(&url, response).await?;
        Ok(created.id)
    }

    async fn session_status(&self, session_id: &str) -> Result<RemoteSession, UpstreamError> {
        let url = format!("{}{session_id}", self.sessions_url());
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        let body: SessionBody = read_json(&url, response).await?;
        Ok(body.into())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;
        let bytes = read_bytes(url, response).await?;
        debug!(url, size = bytes.len(), "Artifact downloaded");
        Ok(bytes)
    }
}
