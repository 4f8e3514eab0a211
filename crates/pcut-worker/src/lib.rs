//! Job lifecycle manager for the PromptCut edit pipeline.
//!
//! Owns the persisted job state machine (queued → processing → done|failed)
//! and orchestrates prompt validation, source download, filter-graph
//! compilation, transcode, and upload for one job per invocation.

pub mod config;
pub mod error;
pub mod logging;
pub mod processor;
pub mod repo;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use processor::{JobPaths, JobProcessor, PROCESSED_COUNTER};
pub use repo::{
    CounterSink, JobStore, MemoryJobStore, MemoryVideoStore, MetricsSink, VideoStore,
};
