//! Object storage for PromptCut: an S3-compatible Spaces client, the
//! [`ObjectStore`] capability trait, and a consistency guard that absorbs
//! upload/read replication lag.

pub mod client;
pub mod error;
pub mod guard;
pub mod store;

pub use client::{SpacesClient, SpacesConfig};
pub use error::{StorageError, StorageResult};
pub use guard::ConsistencyGuard;
pub use store::ObjectStore;
