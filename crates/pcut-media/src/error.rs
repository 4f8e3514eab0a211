//! Error types for media operations.

use std::path::PathBuf;

use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while producing an output artifact.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("input file is missing or empty: {0}")]
    EmptyInput(PathBuf),

    #[error("transcode produced a missing or empty output: {0}")]
    EmptyOutput(PathBuf),

    #[error("transcode failed (exit code {exit_code:?}): {diagnostics}")]
    TranscodeFailed {
        exit_code: Option<i32>,
        /// Truncated excerpt of the transcoder's diagnostic stream.
        diagnostics: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
