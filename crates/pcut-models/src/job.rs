//! Job records and lifecycle states.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::EditPlan;
use crate::video::VideoId;

/// How long a finished output stays downloadable.
pub const OUTPUT_EXPIRY_DAYS: i64 = 7;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID (`job_` plus 12 hex chars).
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("job_{}", &hex[..12]))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Persisted job status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states receive no further updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A video edit job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub job_id: JobId,
    pub user_id: String,
    pub video_id: VideoId,
    /// Raw prompt text as submitted.
    pub prompt_text: String,
    /// Plan parsed from the prompt at submission time.
    pub parsed_plan: EditPlan,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a queued job, parsing the prompt immediately.
    pub fn new(
        user_id: impl Into<String>,
        video_id: VideoId,
        prompt_text: impl Into<String>,
    ) -> Self {
        let prompt_text = prompt_text.into();
        let parsed_plan = EditPlan::parse(&prompt_text);
        Self {
            job_id: JobId::generate(),
            user_id: user_id.into(),
            video_id,
            prompt_text,
            parsed_plan,
            status: JobStatus::Queued,
            output_key: None,
            output_expires_at: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Transition to processing.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Processing;
        self
    }

    /// Transition to done with the output location and its expiry.
    pub fn complete(mut self, output_key: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        self.status = JobStatus::Done;
        self.output_key = Some(output_key.into());
        self.output_expires_at = Some(expires_at);
        self.completed_at = Some(Utc::now());
        self
    }

    /// Transition to failed with a human-readable message.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.completed_at = Some(Utc::now());
        self
    }
}
