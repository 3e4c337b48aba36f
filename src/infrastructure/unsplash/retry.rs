use std::future::Future;

use tracing::debug;

use crate::domain::errors::FetchError;

/// Default number of attempts per logical request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made. No delay between attempts.
pub async fn with_retry<T, F, Fut>(max_attempts: u32, label: &str, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                debug!(label, attempt, max_attempts, error = %e, "Retrying request");
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
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(3, "test", || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(FetchError::transport("flaky"))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(assert_ok!(result), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(3, "test", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::transport("down"))
        })
        .await;

        assert_err!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_escalates_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(3, "test", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::cannot_decode("bad"))
        })
        .await;

        assert_err!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let _ = with_retry(0, "test", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, FetchError>(())
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
