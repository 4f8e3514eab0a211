//! Shared data models for the PromptCut backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their lifecycle states
//! - Uploaded video records
//! - Edit plans parsed from free-text prompts
//! - Encoding configuration

pub mod encoding;
pub mod job;
pub mod plan;
pub mod timestamp;
pub mod video;

pub use encoding::EncodingConfig;
pub use job::{Job, JobId, JobStatus, OUTPUT_EXPIRY_DAYS};
pub use plan::{EditPlan, PlanError, ResolvedSegment, Segment, DEFAULT_OUTPUT_FORMAT, DEFAULT_QUALITY};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
pub use video::{VideoId, VideoRecord, MAX_FILE_SIZE, PAYMENT_THRESHOLD, SUPPORTED_EXTENSIONS};
