//! Media assets and their scene metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media kind of an uploaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Scene descriptor attached to an asset at upload time.
///
/// `scene_number` is what the analysis pipeline keys on; assets without one
/// are never candidates for pairwise comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneInfo {
    /// Scene this asset belongs to, if the uploader tagged one
    pub scene_number: Option<u32>,

    /// Optional timecode range within the source footage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timecode_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timecode_end: Option<String>,
}

/// A media asset registered to a project.
///
/// Assets are immutable once created and read-only to the analysis
/// pipeline. The blob itself lives in external storage; `url` is its
/// locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: Uuid,
    pub project_id: Uuid,
    pub kind: MediaKind,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub scene_info: SceneInfo,
    /// Arbitrary uploader-supplied metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub uploaded_at: DateTime<Utc>,
}

impl Asset {
    /// Scene number shortcut used by the candidate selector
    pub fn scene_number(&self) -> Option<u32> {
        self.scene_info.scene_number
    }
}
