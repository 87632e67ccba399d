use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───── Host Models ──────────────────────────────────────────────────

/// A file stored on the media host.
///
/// Only the fields the relay relies on are typed; everything else the host
/// sends is kept in `extra` so listings are returned unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub public_id: String,

    #[serde(default)]
    pub secure_url: String,

    pub resource_type: ResourceType,

    #[serde(default)]
    pub bytes: u64,

    #[serde(default)]
    pub format: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub resources: Vec<MediaAsset>,
}

/// Outcome of a destroy call; the host reports unknown ids instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Deleted,
    NotFound,
}

// ───── Gateway Requests ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub resource_type: ResourceType,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub upload_preset: String,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub resource_type: ResourceType,
    pub prefix: String,
    pub max_results: u32,
}

/// Where uploads of each kind are stored and how listings are filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePolicy {
    pub image_upload_preset: String,
    pub video_upload_preset: String,
    pub image_folder: String,
    pub video_folder: String,
    pub video_list_prefix: String,
    pub video_list_max_results: u32,
}

impl StoragePolicy {
    pub fn preset_for(&self, kind: ResourceType) -> &str {
        match kind {
            ResourceType::Image => &self.image_upload_preset,
            ResourceType::Video => &self.video_upload_preset,
        }
    }

    pub fn folder_for(&self, kind: ResourceType) -> &str {
        match kind {
            ResourceType::Image => &self.image_folder,
            ResourceType::Video => &self.video_folder,
        }
    }

    pub fn video_listing(&self) -> ListQuery {
        ListQuery {
            resource_type: ResourceType::Video,
            prefix: self.video_list_prefix.clone(),
            max_results: self.video_list_max_results,
        }
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        StoragePolicy {
            image_upload_preset: "images".to_string(),
            video_upload_preset: "videos".to_string(),
            image_folder: "images".to_string(),
            video_folder: "videos".to_string(),
            video_list_prefix: "videos/".to_string(),
            video_list_max_results: 100,
        }
    }
}

// ───── API Models ───────────────────────────────────────────────────

/// A file received by the relay, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared MIME type, or the one sniffed from the leading bytes.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type
            .clone()
            .or_else(|| infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub secure_url: String,
    pub public_id: String,
}

impl TryFrom<MediaAsset> for UploadedMedia {
    type Error = String;

    fn try_from(asset: MediaAsset) -> Result<Self, Self::Error> {
        if asset.secure_url.trim().is_empty() {
            return Err("missing secure_url".to_string());
        }
        if asset.public_id.trim().is_empty() {
            return Err("missing public_id".to_string());
        }

        Ok(UploadedMedia {
            secure_url: asset.secure_url,
            public_id: asset.public_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
