//! Job lifecycle orchestration.
//!
//! One job runs as one [`JobProcessor::run`] invocation: validate the plan
//! parsed at submission, pull the source object through the consistency
//! guard, compile the filter graph, transcode, upload, and persist exactly
//! one terminal state. Every failure inside a run becomes the job's `failed`
//! state; nothing escapes to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use pcut_media::{FilterGraph, TranscodeRequest, Transcoder};
use pcut_models::{EncodingConfig, Job, JobId, VideoRecord, DEFAULT_OUTPUT_FORMAT};
use pcut_storage::{ConsistencyGuard, ObjectStore, StorageError};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::repo::{JobStore, MetricsSink, VideoStore};

/// Daily counter bumped once per successfully processed job.
pub const PROCESSED_COUNTER: &str = "videos_processed";

/// Local and remote file layout for one job run. Scratch files live under a
/// directory named by the job id, so concurrent jobs never collide on disk.
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub scratch_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub output_key: String,
}

impl JobPaths {
    /// Resolve paths deterministically from job and video identifiers.
    pub fn resolve(work_dir: &str, job: &Job, video: &VideoRecord) -> Self {
        let scratch_dir = PathBuf::from(work_dir).join(job.job_id.as_str());
        let format = output_format(job);
        Self {
            input: scratch_dir.join(format!("input.{}", video.extension)),
            output: scratch_dir.join(format!("output.{format}")),
            output_key: format!("outputs/{}/{}.{}", job.user_id, job.job_id, format),
            scratch_dir,
        }
    }
}

fn output_format(job: &Job) -> &str {
    let format = job.parsed_plan.output_format.trim();
    if format.is_empty() {
        DEFAULT_OUTPUT_FORMAT
    } else {
        format
    }
}

fn content_type_for(format: &str) -> &'static str {
    match format {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mpeg" => "video/mpeg",
        "ogv" => "video/ogg",
        _ => "application/octet-stream",
    }
}

/// Owns the persisted job state machine and orchestrates full runs.
pub struct JobProcessor {
    config: WorkerConfig,
    store: Arc<dyn ObjectStore>,
    jobs: Arc<dyn JobStore>,
    videos: Arc<dyn VideoStore>,
    metrics: Arc<dyn MetricsSink>,
    transcoder: Transcoder,
    guard: ConsistencyGuard,
}

impl JobProcessor {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn ObjectStore>,
        jobs: Arc<dyn JobStore>,
        videos: Arc<dyn VideoStore>,
        metrics: Arc<dyn MetricsSink>,
        transcoder: Transcoder,
    ) -> Self {
        let guard = ConsistencyGuard::default()
            .with_max_attempts(config.guard_max_attempts)
            .with_base_delay(config.guard_base_delay);
        Self {
            config,
            store,
            jobs,
            videos,
            metrics,
            transcoder,
            guard,
        }
    }

    /// Fire-and-forget submission. The caller polls the job record for
    /// status; no error is ever reported synchronously.
    pub fn submit(self: &Arc<Self>, job_id: JobId) {
        let processor = Arc::clone(self);
        tokio::spawn(async move {
            processor.run(&job_id).await;
        });
    }

    /// Run the full lifecycle for one job.
    ///
    /// Transitions queued → processing exactly once at the start, then to
    /// exactly one of done/failed at the end. Scratch files are removed on
    /// both paths.
    pub async fn run(&self, job_id: &JobId) {
        let log = JobLogger::new(job_id);

        let job = match self.jobs.get(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                log.failure("job record not found, nothing to run");
                return;
            }
            Err(e) => {
                log.failure(&format!("failed to load job: {e}"));
                return;
            }
        };

        // Persist processing before any work so a crash mid-run is
        // distinguishable from a job that never started.
        if let Err(e) = self.jobs.mark_processing(job_id).await {
            log.failure(&format!("failed to mark job processing: {e}"));
            return;
        }

        match self.execute(&job, &log).await {
            Ok(output_key) => {
                let expires_at = Utc::now()
                    + chrono::Duration::from_std(self.config.output_retention)
                        .unwrap_or_else(|_| chrono::Duration::days(7));
                if let Err(e) = self.jobs.mark_done(job_id, &output_key, expires_at).await {
                    log.failure(&format!("failed to persist done state: {e}"));
                } else {
                    self.metrics.increment_daily(PROCESSED_COUNTER).await;
                    log.stage("done", &format!("output at {output_key}"));
                }
            }
            Err(e) => {
                let message = e.to_string();
                log.failure(&format!("job failed: {message}"));
                if let Err(e) = self.jobs.mark_failed(job_id, &message).await {
                    log.failure(&format!("failed to persist failed state: {e}"));
                }
            }
        }

        self.cleanup(&job, &log).await;
    }

    /// The fallible middle of a run. Any error here becomes the job's
    /// failure message.
    async fn execute(&self, job: &Job, log: &JobLogger) -> WorkerResult<String> {
        let video = self
            .videos
            .get(&job.video_id)
            .await?
            .ok_or_else(|| WorkerError::VideoMissing(job.video_id.to_string()))?;

        let segments = job.parsed_plan.validate()?;
        log.stage(
            "validate",
            &format!("{} segment(s) in final order", segments.len()),
        );

        let paths = JobPaths::resolve(&self.config.work_dir, job, &video);
        tokio::fs::create_dir_all(&paths.scratch_dir).await?;

        // The upload acknowledgement may precede read visibility; wait it
        // out before pulling the source locally.
        self.guard
            .wait_until_visible(self.store.as_ref(), &video.object_key)
            .await?;
        self.store
            .download_file(&video.object_key, &paths.input)
            .await?;
        log.stage("download", &format!("source at {}", paths.input.display()));

        let graph = FilterGraph::compile(&segments);
        let encoding = EncodingConfig::for_quality(&job.parsed_plan.quality);

        let request = TranscodeRequest {
            input_path: paths.input.clone(),
            output_path: paths.output.clone(),
            graph,
            encoding,
        };
        self.transcoder.transcode(&request).await?;
        log.stage("transcode", "output artifact produced");

        // One existence check after upload; this writer just proved the
        // store round-trips, so a miss here is a hard failure, not lag.
        let format = output_format(job);
        self.store
            .upload_file(&paths.output, &paths.output_key, content_type_for(format))
            .await?;
        if !self.store.exists(&paths.output_key).await? {
            return Err(StorageError::UploadFailed(format!(
                "uploaded object not visible: {}",
                paths.output_key
            ))
            .into());
        }
        log.stage("upload", &paths.output_key);

        Ok(paths.output_key)
    }

    /// Best-effort removal of the per-job scratch directory. Errors are
    /// logged and never propagated.
    async fn cleanup(&self, job: &Job, log: &JobLogger) {
        let scratch_dir = PathBuf::from(&self.config.work_dir).join(job.job_id.as_str());
        match tokio::fs::remove_dir_all(&scratch_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log.warning(&format!(
                "failed to remove scratch dir {}: {e}",
                scratch_dir.display()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pcut_models::VideoId;

    fn job_with_prompt(prompt: &str) -> (Job, VideoRecord) {
        let video = VideoRecord::new("u1", "src.mp4", 50_000_000, "mp4", "uploads/u1/src.mp4");
        let job = Job::new("u1", video.video_id.clone(), prompt);
        (job, video)
    }

    #[test]
    fn paths_are_namespaced_by_job_id() {
        let (job, video) = job_with_prompt("Keep: 0-10.");
        let paths = JobPaths::resolve("/tmp/pcut", &job, &video);

        let expected_dir = format!("/tmp/pcut/{}", job.job_id);
        assert_eq!(paths.scratch_dir.to_str().unwrap(), expected_dir);
        assert_eq!(
            paths.input.to_str().unwrap(),
            format!("{expected_dir}/input.mp4")
        );
        assert_eq!(
            paths.output.to_str().unwrap(),
            format!("{expected_dir}/output.mp4")
        );
        assert_eq!(paths.output_key, format!("outputs/u1/{}.mp4", job.job_id));
    }

    #[test]
    fn output_format_follows_the_plan() {
        let (job, video) = job_with_prompt("Keep: 0-10. Output: webm.");
        let paths = JobPaths::resolve("/tmp/pcut", &job, &video);
        assert!(paths.output.to_str().unwrap().ends_with("output.webm"));
        assert!(paths.output_key.ends_with(".webm"));
    }

    #[test]
    fn empty_output_format_falls_back_to_mp4() {
        let (mut job, video) = job_with_prompt("Keep: 0-10.");
        job.parsed_plan.output_format = String::new();
        let paths = JobPaths::resolve("/tmp/pcut", &job, &video);
        assert!(paths.output_key.ends_with(".mp4"));
    }

    #[test]
    fn input_extension_comes_from_the_video_record() {
        let (job, mut video) = job_with_prompt("Keep: 0-10.");
        video.extension = "mkv".to_string();
        let paths = JobPaths::resolve("/tmp/pcut", &job, &video);
        assert!(paths.input.to_str().unwrap().ends_with("input.mkv"));
    }

    #[test]
    fn content_types_cover_supported_containers() {
        assert_eq!(content_type_for("mp4"), "video/mp4");
        assert_eq!(content_type_for("webm"), "video/webm");
        assert_eq!(content_type_for("flv"), "application/octet-stream");
    }
}
