//! Request admission control.
//!
//! Authenticated callers get an independent token-bucket partition keyed by
//! identity id; all anonymous callers share one fixed window (deliberately
//! coarse, not per-IP). Partitions are created lazily on first use and live
//! for the lifetime of the store, which the serving state owns.

pub mod fixed_window;
pub mod token_bucket;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

pub use fixed_window::FixedWindow;
pub use token_bucket::TokenBucket;

/// Rejection lease metadata: how long the caller should wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub retry_after: Duration,
}

impl Rejection {
    /// Whole seconds for the Retry-After header, rounded up so a caller
    /// who waits exactly this long lands past the replenishment.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs.max(1)
        }
    }
}

pub struct RateLimiterStore {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, Arc<TokenBucket>>>,
    anonymous: FixedWindow,
}

impl RateLimiterStore {
    pub fn new(config: RateLimitConfig) -> Self {
        let anonymous = FixedWindow::new(
            config.anonymous_permit_limit,
            Duration::from_secs(config.anonymous_window_secs),
        );
        Self { config, buckets: Mutex::new(HashMap::new()), anonymous }
    }

    /// Admit one request for the given identity, or reject with wait
    /// guidance. A present, non-empty identity selects (or lazily creates)
    /// that identity's bucket; everything else shares the anonymous window.
    pub async fn acquire(&self, identity_id: Option<&str>) -> Result<(), Rejection> {
        if !self.config.enabled {
            return Ok(());
        }

        match identity_id {
            Some(id) if !id.is_empty() => {
                let bucket = self.bucket_for(id).await;
                bucket.acquire().await
            }
            _ => self.anonymous.acquire().await,
        }
    }

    async fn bucket_for(&self, identity_id: &str) -> Arc<TokenBucket> {
        let mut buckets = self.buckets.lock().await;
        if let Some(bucket) = buckets.get(identity_id) {
            return Arc::clone(bucket);
        }

        let bucket = Arc::new(TokenBucket::new(
            self.config.token_limit,
            self.config.tokens_per_period,
            Duration::from_secs(self.config.replenishment_secs),
            self.config.queue_limit,
        ));
        buckets.insert(identity_id.to_string(), Arc::clone(&bucket));
        bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            token_limit: 2,
            tokens_per_period: 1,
            replenishment_secs: 60,
            queue_limit: 0,
            anonymous_permit_limit: 5,
            anonymous_window_secs: 60,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_identities_get_independent_buckets() {
        let store = RateLimiterStore::new(test_config());

        store.acquire(Some("alice")).await.unwrap();
        store.acquire(Some("alice")).await.unwrap();
        assert!(store.acquire(Some("alice")).await.is_err());

        // Bob's partition is untouched by Alice exhausting hers
        store.acquire(Some("bob")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn anonymous_callers_share_one_window() {
        let store = RateLimiterStore::new(test_config());

        for _ in 0..5 {
            store.acquire(None).await.unwrap();
        }
        // Empty identity id counts as anonymous too
        let rejection = store.acquire(Some("")).await.unwrap_err();
        assert!(rejection.retry_after_secs() <= 60);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_limiter_admits_everything() {
        let store = RateLimiterStore::new(RateLimitConfig { enabled: false, ..test_config() });
        for _ in 0..100 {
            store.acquire(None).await.unwrap();
        }
    }

    #[test]
    fn retry_after_rounds_up_to_whole_seconds() {
        let rejection = Rejection { retry_after: Duration::from_millis(1500) };
        assert_eq!(rejection.retry_after_secs(), 2);

        let rejection = Rejection { retry_after: Duration::ZERO };
        assert_eq!(rejection.retry_after_secs(), 1);
    }
}
