//! Uploaded video records.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted upload size (2 GiB).
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;
/// Uploads above this size require payment before processing (200 MiB).
pub const PAYMENT_THRESHOLD: u64 = 200 * 1024 * 1024;
/// Container extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: [&str; 7] =
    ["mp4", "mkv", "avi", "mov", "mpeg", "ogv", "webm"];

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID (`vid_` plus 12 hex chars).
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("vid_{}", &hex[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An uploaded source video, recorded by the upload collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    pub video_id: VideoId,
    pub user_id: String,
    pub filename: String,
    pub size_bytes: u64,
    /// Container extension without the leading dot.
    pub extension: String,
    /// Object-store key the upload landed at.
    pub object_key: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub payment_required: bool,
    #[serde(default)]
    pub payment_completed: bool,
}

impl VideoRecord {
    pub fn new(
        user_id: impl Into<String>,
        filename: impl Into<String>,
        size_bytes: u64,
        extension: impl Into<String>,
        object_key: impl Into<String>,
    ) -> Self {
        Self {
            video_id: VideoId::generate(),
            user_id: user_id.into(),
            filename: filename.into(),
            size_bytes,
            extension: extension.into(),
            object_key: object_key.into(),
            uploaded_at: Utc::now(),
            payment_required: size_bytes > PAYMENT_THRESHOLD,
            payment_completed: false,
        }
    }

    /// Whether the extension is one the pipeline accepts.
    pub fn extension_supported(&self) -> bool {
        SUPPORTED_EXTENSIONS.contains(&self.extension.as_str())
    }

    /// Whether the video is cleared for processing.
    pub fn payment_cleared(&self) -> bool {
        !self.payment_required || self.payment_completed
    }
}
