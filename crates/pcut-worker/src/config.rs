//! Worker configuration.

use std::time::Duration;

const DEFAULT_WORK_DIR: &str = "/tmp/pcut";
const DEFAULT_OUTPUT_RETENTION_SECS: u64 =
    pcut_models::OUTPUT_EXPIRY_DAYS as u64 * 24 * 60 * 60;
const DEFAULT_GUARD_MAX_ATTEMPTS: u32 = 6;
const DEFAULT_GUARD_BASE_DELAY_MS: u64 = 500;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root directory for per-job scratch files.
    pub work_dir: String,
    /// How long finished outputs stay downloadable.
    pub output_retention: Duration,
    /// Existence probes before the consistency guard gives up.
    pub guard_max_attempts: u32,
    /// Initial backoff delay between guard probes.
    pub guard_base_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: DEFAULT_WORK_DIR.to_string(),
            output_retention: Duration::from_secs(DEFAULT_OUTPUT_RETENTION_SECS),
            guard_max_attempts: DEFAULT_GUARD_MAX_ATTEMPTS,
            guard_base_delay: Duration::from_millis(DEFAULT_GUARD_BASE_DELAY_MS),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORKER_WORK_DIR")
                .unwrap_or_else(|_| DEFAULT_WORK_DIR.to_string()),
            output_retention: Duration::from_secs(
                env_parse("WORKER_OUTPUT_RETENTION_SECS", DEFAULT_OUTPUT_RETENTION_SECS),
            ),
            guard_max_attempts: env_parse(
                "WORKER_GUARD_MAX_ATTEMPTS",
                DEFAULT_GUARD_MAX_ATTEMPTS,
            ),
            guard_base_delay: Duration::from_millis(env_parse(
                "WORKER_GUARD_BASE_DELAY_MS",
                DEFAULT_GUARD_BASE_DELAY_MS,
            )),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = WorkerConfig::default();
        assert_eq!(config.work_dir, "/tmp/pcut");
        assert_eq!(config.output_retention, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(config.guard_max_attempts, 6);
        assert_eq!(config.guard_base_delay, Duration::from_millis(500));
    }
}
