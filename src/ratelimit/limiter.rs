//! Rate Limiter
//!
//! Fixed-window request counting on top of a CacheStore.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{Clock, SharedCache};
use crate::error::RateLimitError;
use crate::ratelimit::{PolicyKind, RateLimitPolicies, RateLimitPolicy, RateWindow};

// == Decision ==
/// Outcome of an admitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Quota of the applied policy
    pub limit: u32,
    /// Requests still admissible in the current window
    pub remaining: u32,
    /// Count recorded for this window, including this request
    pub count: u32,
}

// == Rate Limiter ==
/// Admits or rejects requests per (client, route) against a policy table.
///
/// Windows live in the cache under `<namespace>:<client>:<route>`. The
/// read-increment-write of a window happens under a single write lock on the
/// store, so concurrent requests on one key cannot both read the same count.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: SharedCache,
    policies: Arc<RateLimitPolicies>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter storing its windows in `cache`.
    ///
    /// `clock` should be the clock the store was built with so that window
    /// arithmetic and entry TTLs agree.
    pub fn new(cache: SharedCache, policies: RateLimitPolicies, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            policies: Arc::new(policies),
            clock,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Checks one request against the named policy.
    pub async fn check(
        &self,
        kind: PolicyKind,
        client: &str,
        route: &str,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let policy = self.policies.get(kind);
        self.check_policy(policy, client, route).await
    }

    /// Checks one request against an explicit policy.
    ///
    /// A rejected request is not written back: the stored window keeps the
    /// count it had, so every further request in the window is rejected too
    /// until the window elapses.
    pub async fn check_policy(
        &self,
        policy: &RateLimitPolicy,
        client: &str,
        route: &str,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let mut cache = self.cache.write().await;
        let key = cache.generate_key(&format!("{}:{}", client, route));
        let now = self.clock.now_ms();

        let window = cache
            .get::<RateWindow>(&key)
            .unwrap_or_else(|| RateWindow::open(now))
            .record(now, policy.window_ms);

        if window.count > policy.max_requests {
            let retry_after_secs = window
                .resets_in_ms(now, policy.window_ms)
                .div_ceil(1000)
                .max(1);
            warn!(
                "Rate limit exceeded for '{}' ({} requests, limit {})",
                key, window.count, policy.max_requests
            );
            return Err(RateLimitError {
                message: policy.message.clone(),
                retry_after_secs,
                limit: policy.max_requests,
            });
        }

        cache.set(&key, &window, Some(policy.window_ttl_secs()));
        debug!("Admitted '{}' ({}/{})", key, window.count, policy.max_requests);

        Ok(RateLimitDecision {
            limit: policy.max_requests,
            remaining: policy.max_requests - window.count,
            count: window.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, ManualClock, RATE_LIMIT_NAMESPACE};
    use tokio_test::{assert_err, assert_ok};

    fn limiter_with(policy: RateLimitPolicy) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cache = CacheStore::with_clock(RATE_LIMIT_NAMESPACE, clock.clone()).shared();
        let policies = RateLimitPolicies {
            default: policy.clone(),
            strict: policy.clone(),
            admin: policy.clone(),
            auth: policy,
        };
        (RateLimiter::new(cache, policies, clock.clone()), clock)
    }

    fn three_per_second() -> RateLimitPolicy {
        RateLimitPolicy::new(1000, 3, "Slow down")
    }

    #[tokio::test]
    async fn test_fixed_window_scenario() {
        let (limiter, clock) = limiter_with(three_per_second());

        for expected_remaining in [2, 1, 0] {
            let decision = assert_ok!(limiter.check(PolicyKind::Default, "10.0.0.1", "/products").await);
            assert_eq!(decision.remaining, expected_remaining);
            clock.advance_ms(100);
        }

        let err = assert_err!(limiter.check(PolicyKind::Default, "10.0.0.1", "/products").await);
        assert_eq!(err.message, "Slow down");
        assert_eq!(err.limit, 3);
        assert_eq!(err.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);

        clock.advance_ms(1000);
        let decision = assert_ok!(limiter.check(PolicyKind::Default, "10.0.0.1", "/products").await);
        assert_eq!(decision.count, 1);
    }

    #[tokio::test]
    async fn test_rejections_keep_rejecting_within_window() {
        let (limiter, clock) = limiter_with(RateLimitPolicy::new(1000, 1, "no"));

        assert_ok!(limiter.check(PolicyKind::Strict, "c", "/r").await);
        for _ in 0..5 {
            clock.advance_ms(50);
            assert_err!(limiter.check(PolicyKind::Strict, "c", "/r").await);
        }
    }

    #[tokio::test]
    async fn test_boundary_request_is_in_old_window() {
        let (limiter, clock) = limiter_with(RateLimitPolicy::new(1000, 2, "no"));

        assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);
        clock.advance_ms(500);
        assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);

        // exactly window_ms after the first request: still the old window
        clock.advance_ms(500);
        assert_err!(limiter.check(PolicyKind::Default, "c", "/r").await);

        // one millisecond later the window has elapsed
        clock.advance_ms(1);
        let decision = assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);
        assert_eq!(decision.count, 1);
    }

    #[tokio::test]
    async fn test_single_request_window_holds_at_boundary() {
        let (limiter, clock) = limiter_with(RateLimitPolicy::new(1000, 1, "no"));

        assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);

        // no later admission refreshed the stored window
        clock.advance_ms(1000);
        let err = assert_err!(limiter.check(PolicyKind::Default, "c", "/r").await);
        assert_eq!(err.retry_after_secs, 1);

        clock.advance_ms(1);
        let decision = assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);
        assert_eq!(decision.count, 1);
    }

    #[tokio::test]
    async fn test_quota_is_per_client_and_route() {
        let (limiter, _clock) = limiter_with(RateLimitPolicy::new(1000, 1, "no"));

        assert_ok!(limiter.check(PolicyKind::Default, "a", "/x").await);
        assert_ok!(limiter.check(PolicyKind::Default, "b", "/x").await);
        assert_ok!(limiter.check(PolicyKind::Default, "a", "/y").await);
        assert_err!(limiter.check(PolicyKind::Default, "a", "/x").await);
    }

    #[tokio::test]
    async fn test_retry_after_counts_down() {
        let (limiter, clock) = limiter_with(RateLimitPolicy::new(10_000, 1, "no"));

        assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);
        clock.advance_ms(2_500);
        let err = assert_err!(limiter.check(PolicyKind::Default, "c", "/r").await);
        assert_eq!(err.retry_after_secs, 8);

        clock.advance_ms(7_400);
        let err = assert_err!(limiter.check(PolicyKind::Default, "c", "/r").await);
        assert_eq!(err.retry_after_secs, 1);
    }

    #[tokio::test]
    async fn test_windows_stored_with_ttl() {
        let (limiter, clock) = limiter_with(RateLimitPolicy::new(1500, 5, "no"));

        assert_ok!(limiter.check(PolicyKind::Default, "c", "/r").await);
        assert_eq!(limiter.cache().read().await.len(), 1);

        // ttl is 2 seconds: the first whole second past the 1.5s window
        clock.advance_ms(1999);
        assert_eq!(limiter.cache().write().await.cleanup_expired(), 0);
        clock.advance_ms(1);
        assert_eq!(limiter.cache().write().await.cleanup_expired(), 1);
    }

    #[tokio::test]
    async fn test_window_key_format() {
        let (limiter, _clock) = limiter_with(three_per_second());

        assert_ok!(limiter.check(PolicyKind::Default, "10.0.0.1", "/products").await);
        let mut cache = limiter.cache().write().await;
        let window: Option<RateWindow> = cache.get("rate-limit:10.0.0.1:/products");
        assert_eq!(window.map(|w| w.count), Some(1));
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_overshoot() {
        let (limiter, _clock) = limiter_with(RateLimitPolicy::new(60_000, 10, "no"));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.check(PolicyKind::Default, "c", "/r").await.is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}
