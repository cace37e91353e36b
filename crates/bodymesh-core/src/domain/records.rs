//! Avatar and session records held by the external record store.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::MeasurementRecord;

/// Lifecycle of an avatar. There is no way back from `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStatus {
    Modeling,
    Rigging,
    Complete,
    Failed,
}

impl AvatarStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modeling => "modeling",
            Self::Rigging => "rigging",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AvatarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a reconstruction session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Complete,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded photograph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    #[must_use]
    pub fn png(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "image/png".to_string(),
            bytes,
        }
    }
}

/// Everything needed to create an avatar record.
#[derive(Debug, Clone)]
pub struct NewAvatar {
    pub height_cm: f64,
    pub gender: String,
    pub size_reco: Option<String>,
    pub measurements: Option<MeasurementRecord>,
    pub front: ImageFile,
    pub side: ImageFile,
    pub back: ImageFile,
}

/// An avatar as returned by the store after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRecord {
    pub id: String,
    /// Stored filename of the front image.
    pub front_view: String,
    /// Stored filename of the side image.
    pub side_view: String,
    /// Stored filename of the back image.
    #[serde(default)]
    pub back_view: String,
}

/// A session record still waiting on the reconstruction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSession {
    /// Store-assigned record id.
    pub record_id: String,
    /// Remote reconstruction session id.
    pub session_id: String,
    /// Avatar the session belongs to.
    pub avatar_id: String,
}

/// Mesh download locations reported by a finished session.
///
/// Partial sets are valid: either URL may be absent, but a ready session
/// always carries at least one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obj_url: Option<String>,
}

impl MeshUrls {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.glb_url.is_none() && self.obj_url.is_none()
    }
}

/// Mesh file kinds attached to an avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Glb,
    Obj,
}

impl MeshFormat {
    /// Store field that receives this file.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Glb => "unrigged_glb",
            Self::Obj => "unrigged_obj",
        }
    }

    #[must_use]
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Glb => "model.glb",
            Self::Obj => "model.obj",
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Glb => "model/gltf-binary",
            Self::Obj => "text/plain",
        }
    }
}

/// A downloaded mesh file ready to attach to an avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshAttachment {
    pub format: MeshFormat,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AvatarStatus::Rigging).unwrap(),
            "\"rigging\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(AvatarStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_mesh_urls_omit_missing() {
        let urls = MeshUrls {
            glb_url: Some("https://cdn/x.glb".into()),
            obj_url: None,
        };
        let json = serde_json::to_value(&urls).unwrap();
        assert_eq!(json["glb_url"], "https://cdn/x.glb");
        assert!(json.get("obj_url").is_none());
        assert!(!urls.is_empty());
        assert!(MeshUrls::default().is_empty());
    }

    #[test]
    fn test_avatar_record_back_view_optional() {
        let record: AvatarRecord =
            serde_json::from_str(r#"{"id":"a1","front_view":"f.png","side_view":"s.png"}"#)
                .unwrap();
        assert_eq!(record.id, "a1");
        assert!(record.back_view.is_empty());
    }
}
