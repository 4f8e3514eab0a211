//! Consistency guard for eventually-consistent object stores.
//!
//! The upstream store may acknowledge an upload before the object is visible
//! to subsequent reads. The guard absorbs that replication lag with a bounded
//! exponential backoff so callers never observe the race.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Default number of existence probes before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;
/// Default delay after the first failed probe.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
/// Default ceiling on the probe delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(8);

/// Bounded existence poller with exponential backoff.
#[derive(Debug, Clone)]
pub struct ConsistencyGuard {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for ConsistencyGuard {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl ConsistencyGuard {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay after the probe at `attempt` (0-based): doubles each time,
    /// capped at the maximum.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Wait until `key` is visible in the store.
    ///
    /// Only the not-found case is retried; any other error propagates
    /// immediately. Exhausting all attempts yields
    /// [`StorageError::ObjectNotVisible`]. The sleeps suspend cooperatively,
    /// never blocking the runtime.
    pub async fn wait_until_visible(
        &self,
        store: &dyn ObjectStore,
        key: &str,
    ) -> StorageResult<()> {
        for attempt in 0..self.max_attempts {
            if store.exists(key).await? {
                if attempt > 0 {
                    debug!(key, attempt, "object became visible");
                }
                return Ok(());
            }

            // No sleep after the final probe.
            if attempt + 1 < self.max_attempts {
                let delay = self.delay_for_attempt(attempt);
                debug!(key, attempt, ?delay, "object not yet visible, backing off");
                tokio::time::sleep(delay).await;
            }
        }

        warn!(
            key,
            attempts = self.max_attempts,
            "object never became visible"
        );
        Err(StorageError::ObjectNotVisible {
            key: key.to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    /// Store whose key becomes visible after a set number of probes.
    struct LaggyStore {
        visible_after: u32,
        probes: AtomicU32,
    }

    impl LaggyStore {
        fn new(visible_after: u32) -> Self {
            Self {
                visible_after,
                probes: AtomicU32::new(0),
            }
        }

        fn probe_count(&self) -> u32 {
            self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStore for LaggyStore {
        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            let seen = self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(seen >= self.visible_after)
        }

        async fn download_file(&self, _key: &str, _path: &Path) -> StorageResult<()> {
            unimplemented!("not exercised")
        }

        async fn upload_file(
            &self,
            _path: &Path,
            _key: &str,
            _content_type: &str,
        ) -> StorageResult<()> {
            unimplemented!("not exercised")
        }

        async fn delete_object(&self, _key: &str) -> StorageResult<()> {
            unimplemented!("not exercised")
        }
    }

    /// Store whose probes always fail with a non-retriable error.
    struct BrokenStore;

    #[async_trait]
    impl ObjectStore for BrokenStore {
        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::AwsSdk("access denied".to_string()))
        }

        async fn download_file(&self, _key: &str, _path: &Path) -> StorageResult<()> {
            unimplemented!("not exercised")
        }

        async fn upload_file(
            &self,
            _path: &Path,
            _key: &str,
            _content_type: &str,
        ) -> StorageResult<()> {
            unimplemented!("not exercised")
        }

        async fn delete_object(&self, _key: &str) -> StorageResult<()> {
            unimplemented!("not exercised")
        }
    }

    fn fast_guard(max_attempts: u32) -> ConsistencyGuard {
        ConsistencyGuard::new(
            max_attempts,
            Duration::from_millis(1),
            Duration::from_millis(4),
        )
    }

    #[tokio::test]
    async fn immediately_visible_object_probes_once() {
        let store = LaggyStore::new(0);
        fast_guard(6).wait_until_visible(&store, "k").await.unwrap();
        assert_eq!(store.probe_count(), 1);
    }

    #[tokio::test]
    async fn stops_probing_once_visible() {
        let store = LaggyStore::new(3);
        fast_guard(6).wait_until_visible(&store, "k").await.unwrap();
        assert_eq!(store.probe_count(), 4);
    }

    #[tokio::test]
    async fn exhausts_attempts_then_fails() {
        let store = LaggyStore::new(10);
        let err = fast_guard(2)
            .wait_until_visible(&store, "slow-key")
            .await
            .unwrap_err();

        assert_eq!(store.probe_count(), 2);
        match err {
            StorageError::ObjectNotVisible { key, attempts } => {
                assert_eq!(key, "slow-key");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_retriable_errors_propagate_immediately() {
        let err = fast_guard(6)
            .wait_until_visible(&BrokenStore, "k")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AwsSdk(_)));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let guard = ConsistencyGuard::new(
            6,
            Duration::from_millis(500),
            Duration::from_secs(8),
        );
        assert_eq!(guard.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(guard.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(guard.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(guard.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(guard.delay_for_attempt(4), Duration::from_secs(8));
        assert_eq!(guard.delay_for_attempt(5), Duration::from_secs(8));
    }
}
