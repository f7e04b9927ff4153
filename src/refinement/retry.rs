// Retry logic with exponential backoff and a per-call timeout

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::RefinementConfig;
use crate::errors::{GenerationError, GenerationResult};

/// How provider calls are bounded and retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound for a single attempt
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
            call_timeout: config.call_timeout(),
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RefinementConfig::default())
    }
}

/// Execute a provider call with a timeout per attempt and exponential
/// backoff between attempts.
///
/// Only retryable errors (transient provider failures, timeouts) are
/// retried; everything else is returned at once.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: &str, f: F) -> GenerationResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = GenerationResult<T>>,
{
    let attempts = policy.max_retries + 1;
    let mut attempt = 0;

    loop {
        let result = match timeout(policy.call_timeout, f()).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::ProviderTimeout(policy.call_timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    operation,
                    attempt + 1,
                    attempts,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            call_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_delay_doubles() {
        let p = policy();
        assert_eq!(p.delay_for(0), Duration::from_millis(1000));
        assert_eq!(p.delay_for(1), Duration::from_millis(2000));
        assert_eq!(p.delay_for(2), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_retried_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&policy(), "produce", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(GenerationError::transient("503"))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: GenerationResult<()> = with_retry(&policy(), "produce", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::transient("503"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: GenerationResult<()> = with_retry(&policy(), "produce", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::parse("garbage"))
        })
        .await;
        assert!(matches!(result, Err(GenerationError::ParseFailure(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let p = RetryPolicy {
            max_retries: 0,
            ..policy()
        };
        let result: GenerationResult<()> = with_retry(&p, "critique", || async {
            sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(GenerationError::ProviderTimeout(Duration::from_secs(10))));
    }
}
