//! Structured per-job logging.

use pcut_models::JobId;
use tracing::{error, info, warn};

/// Logger carrying the job id so every line of a run is correlatable.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Log a pipeline stage transition.
    pub fn stage(&self, stage: &str, message: &str) {
        info!(job_id = %self.job_id, stage, "{}", message);
    }

    pub fn warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "{}", message);
    }

    pub fn failure(&self, message: &str) {
        error!(job_id = %self.job_id, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_job_id() {
        let logger = JobLogger::new(&JobId::from("job_abc123def456"));
        assert_eq!(logger.job_id(), "job_abc123def456");
    }
}
