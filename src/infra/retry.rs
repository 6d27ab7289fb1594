//! Bounded retry with exponential backoff for provider calls

use crate::domain::error::TourGuideError;
use crate::infra::metrics::Metrics;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Backoff is capped so a misconfigured policy cannot stall a pass
const MAX_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), initial_backoff }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(
        &self,
        op_name: &str,
        metrics: &Metrics,
        mut op: F,
    ) -> Result<T, TourGuideError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TourGuideError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    debug!(
                        op = %op_name,
                        attempt = %attempt,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "provider_retry"
                    );
                    metrics.record_provider_retry();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::Provider;
    use crate::domain::types::TravelerId;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(40), MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let metrics = Metrics::new();
        let calls = &AtomicU32::new(0);
        let id = TravelerId::new();
        let policy = RetryPolicy::new(3, Duration::from_millis(10));

        let result = policy
            .run("location", &metrics, || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TourGuideError::provider(Provider::Location, id, "timeout"))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(metrics.report().provider_retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let metrics = Metrics::new();
        let calls = &AtomicU32::new(0);
        let id = TravelerId::new();

        let result: Result<(), _> = RetryPolicy::new(2, Duration::from_millis(10))
            .run("points", &metrics, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TourGuideError::provider(Provider::RewardPoints, id, "down"))
            })
            .await;

        assert!(matches!(result, Err(TourGuideError::ProviderFailure { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let metrics = Metrics::new();
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::default()
            .run("lookup", &metrics, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TourGuideError::UnknownTraveler("ghost".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
