use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::ProviderError;

/// Fixed-delay retry budget. The budgets here are one or two attempts per
/// call in a small batch, so there is no backoff curve.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first.
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        RetryPolicy { retries, delay }
    }

    pub fn none() -> Self {
        RetryPolicy {
            retries: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Run `op` up to `1 + retries` times, sleeping the fixed delay between
/// attempts. Only transient failures are retried; a not-found or decode
/// error is returned immediately.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.retries && err.is_transient() => {
                attempt += 1;
                debug!(
                    "attempt {}/{} failed, retrying in {:?}: {}",
                    attempt,
                    policy.retries + 1,
                    policy.delay,
                    err
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> ProviderError {
        ProviderError::Http {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: "http://test/schedule".into(),
        }
    }

    fn permanent() -> ProviderError {
        ProviderError::NotFound {
            url: "http://test/summary".into(),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let result = with_retry(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(transient())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_on_persistent_failure() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(1, Duration::ZERO);
        let result: Result<(), _> = with_retry(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let result: Result<(), _> = with_retry(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(permanent()) }
        })
        .await;
        assert!(matches!(result, Err(ProviderError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
