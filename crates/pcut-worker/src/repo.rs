//! Persistence capability traits and in-memory implementations.
//!
//! Durable job and video stores belong to the surrounding system; the
//! pipeline only needs this narrow surface. The in-memory implementations
//! back unit tests and local runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pcut_models::{Job, JobId, VideoId, VideoRecord};

use crate::error::{WorkerError, WorkerResult};

/// Job record store with field-level status updates.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, job_id: &JobId) -> WorkerResult<Option<Job>>;

    /// Persist the queued → processing transition.
    async fn mark_processing(&self, job_id: &JobId) -> WorkerResult<()>;

    /// Persist the terminal done state with the output location and expiry.
    async fn mark_done(
        &self,
        job_id: &JobId,
        output_key: &str,
        expires_at: DateTime<Utc>,
    ) -> WorkerResult<()>;

    /// Persist the terminal failed state with a human-readable message.
    async fn mark_failed(&self, job_id: &JobId, error_message: &str) -> WorkerResult<()>;
}

/// Video record lookup.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get(&self, video_id: &VideoId) -> WorkerResult<Option<VideoRecord>>;
}

/// Sink for date-bucketed usage counters.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn increment_daily(&self, counter: &str);
}

/// In-memory job store.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs
            .lock()
            .expect("job store lock")
            .insert(job.job_id.clone(), job);
    }

    fn update<F>(&self, job_id: &JobId, f: F) -> WorkerResult<()>
    where
        F: FnOnce(Job) -> Job,
    {
        let mut jobs = self.jobs.lock().expect("job store lock");
        match jobs.remove(job_id) {
            Some(job) => {
                jobs.insert(job_id.clone(), f(job));
                Ok(())
            }
            None => Err(WorkerError::repo(format!("job not found: {job_id}"))),
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, job_id: &JobId) -> WorkerResult<Option<Job>> {
        Ok(self
            .jobs
            .lock()
            .expect("job store lock")
            .get(job_id)
            .cloned())
    }

    async fn mark_processing(&self, job_id: &JobId) -> WorkerResult<()> {
        self.update(job_id, |job| job.start())
    }

    async fn mark_done(
        &self,
        job_id: &JobId,
        output_key: &str,
        expires_at: DateTime<Utc>,
    ) -> WorkerResult<()> {
        self.update(job_id, |job| job.complete(output_key, expires_at))
    }

    async fn mark_failed(&self, job_id: &JobId, error_message: &str) -> WorkerResult<()> {
        self.update(job_id, |job| job.fail(error_message))
    }
}

/// In-memory video store.
#[derive(Debug, Default)]
pub struct MemoryVideoStore {
    videos: Mutex<HashMap<VideoId, VideoRecord>>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, video: VideoRecord) {
        self.videos
            .lock()
            .expect("video store lock")
            .insert(video.video_id.clone(), video);
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn get(&self, video_id: &VideoId) -> WorkerResult<Option<VideoRecord>> {
        Ok(self
            .videos
            .lock()
            .expect("video store lock")
            .get(video_id)
            .cloned())
    }
}

/// Metrics sink forwarding to the `metrics` registry, labeled by day so
/// per-date totals can be aggregated downstream.
#[derive(Debug, Default, Clone)]
pub struct CounterSink;

#[async_trait]
impl MetricsSink for CounterSink {
    async fn increment_daily(&self, counter: &str) {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        metrics::counter!(
            "pcut_daily_total",
            "counter" => counter.to_string(),
            "date" => date,
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pcut_models::JobStatus;

    #[tokio::test]
    async fn job_store_transitions() {
        let store = MemoryJobStore::new();
        let job = Job::new("u1", VideoId::from("vid_x"), "Keep: 0-10.");
        let job_id = job.job_id.clone();
        store.insert(job);

        store.mark_processing(&job_id).await.unwrap();
        assert_eq!(
            store.get(&job_id).await.unwrap().unwrap().status,
            JobStatus::Processing
        );

        store
            .mark_done(&job_id, "outputs/u1/x.mp4", Utc::now())
            .await
            .unwrap();
        let job = store.get(&job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.output_key.as_deref(), Some("outputs/u1/x.mp4"));
    }

    #[tokio::test]
    async fn updating_a_missing_job_is_an_error() {
        let store = MemoryJobStore::new();
        let err = store
            .mark_failed(&JobId::from("job_missing"), "boom")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Repo(_)));
    }

    #[tokio::test]
    async fn video_store_lookup() {
        let store = MemoryVideoStore::new();
        let video = VideoRecord::new("u1", "a.mp4", 1, "mp4", "uploads/u1/a.mp4");
        let video_id = video.video_id.clone();
        store.insert(video);

        assert!(store.get(&video_id).await.unwrap().is_some());
        assert!(store
            .get(&VideoId::from("vid_missing"))
            .await
            .unwrap()
            .is_none());
    }
}
