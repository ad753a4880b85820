//! In-memory per-client rate limiter using governor crate.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use blog_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    DefaultClock,
    StateInformationMiddleware,
>;

/// Keys tracked before idle entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Checks between two pruning sweeps.
const PRUNE_INTERVAL: u64 = 1_024;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window, per client.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Per-key rate limiter using the GCRA algorithm.
///
/// A client may burst up to `max_requests` and then regains one request every
/// `window / max_requests`, which behaves like a sliding window.
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
    clock: DefaultClock,
    checks: AtomicU64,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let burst = NonZeroU32::new(config.max_requests)
            .ok_or_else(|| RateLimitError::Config("max_requests must be non-zero".to_string()))?;
        let period = config.window / config.max_requests;
        let quota = Quota::with_period(period)
            .ok_or_else(|| RateLimitError::Config("window must be non-zero".to_string()))?
            .allow_burst(burst);

        let limiter =
            GovernorRateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>();

        Ok(Self {
            limiter,
            clock: DefaultClock::default(),
            checks: AtomicU64::new(0),
        })
    }

    /// Counts one check and reports whether a pruning sweep is due.
    fn prune_due(&self) -> bool {
        self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == 0
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        if self.prune_due() && self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => Ok(RateLimitResult {
                allowed: true,
                remaining: snapshot.remaining_burst_capacity(),
                reset_after: snapshot.quota().replenish_interval(),
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_after_quota() {
        let limiter = limiter(2);

        let res = limiter.check("10.0.0.1").await.unwrap();
        assert!(res.allowed);
        assert!(res.remaining <= 2);

        let res = limiter.check("10.0.0.1").await.unwrap();
        assert!(res.allowed);

        let res = limiter.check("10.0.0.1").await.unwrap();
        assert!(!res.allowed);
        assert!(res.reset_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = limiter(1);

        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(!limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(limiter.check("10.0.0.2").await.unwrap().allowed);
    }

    #[test]
    fn test_pruning_runs_once_per_interval() {
        let limiter = limiter(5);
        let due = (0..3 * PRUNE_INTERVAL)
            .filter(|_| limiter.prune_due())
            .count();
        assert_eq!(due, 3);
    }

    #[tokio::test]
    async fn test_checks_advance_prune_counter() {
        let limiter = limiter(5);
        limiter.check("10.0.0.1").await.unwrap();
        limiter.check("10.0.0.2").await.unwrap();
        assert_eq!(limiter.checks.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        let result = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        });
        assert!(matches!(result, Err(RateLimitError::Config(_))));
    }
}
