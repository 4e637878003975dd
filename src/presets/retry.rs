//! Retry with fixed backoff and a per-attempt timeout

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use crate::config::{DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_BACKOFF_MS, DEFAULT_FETCH_TIMEOUT_MS};
use crate::exceptions::FetchError;

/// How a single fetch is retried.
///
/// `max_attempts` counts every attempt, the first one included. An attempt
/// that outlives `timeout` is dropped (which cancels it) and counts as a
/// retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_FETCH_BACKOFF_MS),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            timeout,
        }
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error, or
    /// the attempts run out. The last error is returned.
    pub async fn run<T, F, Fut>(&self, url: &str, mut attempt: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut number = 1;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, attempt()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }),
            };

            match outcome {
                Ok(value) => {
                    if number > 1 {
                        debug!("✅ {url} succeeded on attempt {number}");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && number < max_attempts => {
                    warn!(
                        "⚠️ Attempt {number}/{max_attempts} for {url} failed: {e}; retrying in {:?}",
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                    number += 1;
                }
                Err(e) => {
                    debug!("❌ Giving up on {url} after {number} attempt(s): {e}");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    const URL: &str = "https://profiles.test/presets.json";

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(50))
    }

    fn unavailable() -> FetchError {
        FetchError::Status {
            url: URL.to_string(),
            status: 503,
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result = quick(3)
            .run(URL, || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(unavailable())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<(), FetchError> = quick(3)
            .run(URL, || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(unavailable()) }
            })
            .await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<(), FetchError> = quick(3)
            .run(URL, || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(FetchError::Status {
                        url: URL.to_string(),
                        status: 404,
                    })
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_attempt_times_out_and_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let policy = RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(20));
        let result: Result<(), FetchError> = policy
            .run(URL, || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
            })
            .await;
        match result {
            Err(FetchError::Timeout { after, .. }) => assert_eq!(after, Duration::from_millis(20)),
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::default().max_attempts, 3);
    }
}
