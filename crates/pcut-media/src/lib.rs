//! FFmpeg wrapper for the PromptCut transcode pipeline.
//!
//! This crate provides:
//! - Deterministic trim/concat filter-graph compilation
//! - Type-safe FFmpeg command building
//! - A supervised transcode executor with bounded diagnostics capture

pub mod command;
pub mod error;
pub mod graph;
pub mod transcode;

pub use command::{check_ffmpeg, FfmpegCommand, ProcessOutput, ProcessRunner, SystemRunner};
pub use error::{MediaError, MediaResult};
pub use graph::{FilterGraph, AUDIO_OUT_LABEL, VIDEO_OUT_LABEL};
pub use transcode::{TranscodeRequest, Transcoder, DIAGNOSTICS_EXCERPT_LEN};
