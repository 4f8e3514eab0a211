//! Object-store capability interface.

use std::path::Path;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Minimal object-store surface the pipeline depends on.
///
/// Keys are strings within a single bucket. Implemented by
/// [`SpacesClient`](crate::client::SpacesClient) in production and by test
/// doubles in unit tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether an object exists (HEAD request).
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Download an object to a local path, creating parent directories.
    async fn download_file(&self, key: &str, path: &Path) -> StorageResult<()>;

    /// Upload a local file to the given key.
    async fn upload_file(&self, path: &Path, key: &str, content_type: &str)
        -> StorageResult<()>;

    /// Delete an object. Missing objects are not an error.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;
}
