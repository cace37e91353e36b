//! Record store adapter for a PocketBase-style REST API.

use async_trait::async_trait;
use bodymesh_core::domain::{
    AvatarRecord, AvatarStatus, ImageFile, MeshAttachment, MeshUrls, NewAvatar, PendingSession,
    SessionStatus,
};
use bodymesh_core::error::UpstreamError;
use bodymesh_core::ports::RecordStore;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::http::{join, read_json, request_error};

const AVATARS: &str = "api/collections/Avatars/records";
const SESSIONS: &str = "api/collections/Sessions/records";

/// Record store backed by the `Avatars` and `Sessions` collections.
#[derive(Debug, Clone)]
pub struct PocketBaseStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ListPage<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SessionItem {
    id: String,
    session_id: String,
    avatar: String,
}

#[derive(Debug, Serialize)]
struct SessionCompletion<'a> {
    status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh_download_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh_download_url_obj: Option<&'a str>,
}

impl PocketBaseStore {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn avatars_url(&self) -> String {
        join(&self.base_url, AVATARS)
    }

    fn avatar_url(&self, avatar_id: &str) -> String {
        format!("{}/{avatar_id}", self.avatars_url())
    }

    fn sessions_url(&self) -> String {
        join(&self.base_url, SESSIONS)
    }

    async fn patch_avatar(&self, avatar_id: &str, form: Form) -> Result<(), UpstreamError> {
        let url = self.avatar_url(avatar_id);
        let response = self
            .client
            .patch(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        read_json::<serde_json::Value>(&url, response).await?;
        Ok(())
    }

    async fn list_sessions(&self, filter: &str) -> Result<Vec<SessionItem>, UpstreamError> {
        let url = self.sessions_url();
        let response = self
            .client
            .get(&url)
            .query(&[("filter", filter)])
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        let page: ListPage<SessionItem> = read_json(&url, response).await?;
        Ok(page.items)
    }
}

#[async_trait]
impl RecordStore for PocketBaseStore {
    async fn create_avatar(&self, avatar: NewAvatar) -> Result<AvatarRecord, UpstreamError> {
        let url = self.avatars_url();
        let form = avatar_form(&url, avatar)?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        let record: AvatarRecord = read_json(&url, response).await?;
        debug!(avatar_id = %record.id, "Avatar record stored");
        Ok(record)
    }

    async fn update_avatar_status(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
    ) -> Result<(), UpstreamError> {
        self.patch_avatar(avatar_id, Form::new().text("status", status.as_str()))
            .await
    }

    async fn attach_meshes(
        &self,
        avatar_id: &str,
        status: AvatarStatus,
        meshes: Vec<MeshAttachment>,
    ) -> Result<(), UpstreamError> {
        let url = self.avatar_url(avatar_id);
        let mut form = Form::new().text("status", status.as_str());
        for mesh in meshes {
            let part = Part::bytes(mesh.bytes)
                .file_name(mesh.format.filename())
                .mime_str(mesh.format.content_type())
                .map_err(|e| request_error(&url, &e))?;
            form = form.part(mesh.format.field(), part);
        }
        self.patch_avatar(avatar_id, form).await
    }

    async fn create_session(&self, avatar_id: &str, session_id: &str) -> Result<(), UpstreamError> {
        let url = self.sessions_url();
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "avatar": avatar_id,
                "status": SessionStatus::Pending,
                "session_id": session_id,
            }))
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        read_json::<serde_json::Value>(&url, response).await?;
        Ok(())
    }

    async fn list_pending_sessions(&self) -> Result<Vec<PendingSession>, UpstreamError> {
        let items = self.list_sessions(&pending_filter()).await?;
        Ok(items
            .into_iter()
            .map(|item| PendingSession {
                record_id: item.id,
                session_id: item.session_id,
                avatar_id: item.avatar,
            })
            .collect())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        meshes: &MeshUrls,
    ) -> Result<bool, UpstreamError> {
        let items = self.list_sessions(&still_pending_filter(session_id)).await?;
        let Some(item) = items.into_iter().next() else {
            return Ok(false);
        };

        let url = format!("{}/{}", self.sessions_url(), item.id);
        let response = self
            .client
            .patch(&url)
            .json(&SessionCompletion {
                status: SessionStatus::Complete,
                mesh_download_url: meshes.glb_url.as_deref(),
                mesh_download_url_obj: meshes.obj_url.as_deref(),
            })
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        read_json::<serde_json::Value>(&url, response).await?;
        Ok(true)
    }

    fn image_url(&self, avatar_id: &str, filename: &str) -> String {
        join(
            &self.base_url,
            &format!("api/files/Avatars/{avatar_id}/{filename}"),
        )
    }
}

fn pending_filter() -> String {
    format!("status=\"{}\"", SessionStatus::Pending)
}

/// Matches the session only while it is still pending, so a second writer
/// finds nothing to update.
fn still_pending_filter(session_id: &str) -> String {
    format!(
        "session_id='{}' && status=\"{}\"",
        session_id.replace('\'', "\\'"),
        SessionStatus::Pending
    )
}

fn avatar_form(url: &str, avatar: NewAvatar) -> Result<Form, UpstreamError> {
    let mut form = Form::new()
        .text("height", format!("{:.2}", avatar.height_cm))
        .text("gender", avatar.gender)
        .text("status", AvatarStatus::Modeling.as_str());
    if let Some(size) = avatar.size_reco {
        form = form.text("size_reco", size);
    }
    if let Some(measurements) = &avatar.measurements {
        let json = serde_json::to_string(measurements).map_err(|e| UpstreamError::Malformed {
            url: url.to_string(),
            message: format!("measurements could not be encoded: {e}"),
        })?;
        form = form.text("measurements", json);
    }
    let part = |image: ImageFile| image_part(image).map_err(|e| request_error(url, &e));
    Ok(form
        .part("front_view", part(avatar.front)?)
        .part("side_view", part(avatar.side)?)
        .part("back_view", part(avatar.back)?))
}

fn image_part(image: ImageFile) -> Result<Part, reqwest::Error> {
    Part::bytes(image.bytes)
        .file_name(image.filename)
        .mime_str(&image.content_type)
}
