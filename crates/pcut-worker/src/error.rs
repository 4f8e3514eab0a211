//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("video record not found: {0}")]
    VideoMissing(String),

    #[error("invalid edit plan: {0}")]
    Plan(#[from] pcut_models::PlanError),

    #[error("storage error: {0}")]
    Storage(#[from] pcut_storage::StorageError),

    #[error("media error: {0}")]
    Media(#[from] pcut_media::MediaError),

    #[error("record store error: {0}")]
    Repo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn repo(msg: impl Into<String>) -> Self {
        Self::Repo(msg.into())
    }
}
