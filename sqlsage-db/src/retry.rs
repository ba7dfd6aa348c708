//! Connection retry policy (spec §5): up to 3 attempts, exponential backoff
//! of `0.5 * attempt` seconds, only for errors whose message substring-matches
//! "connection", "timeout", or "refused".

use std::future::Future;
use std::time::Duration;

use crate::error::DbError;

/// Default maximum number of attempts (including the first).
pub const MAX_ATTEMPTS: u32 = 3;

/// Run `f`, retrying up to [`MAX_ATTEMPTS`] times while the error is
/// transient per [`DbError::is_transient`]. Non-transient errors fail
/// immediately without retrying.
pub async fn with_retry<T, F, Fut>(mut f: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_ATTEMPTS && err.is_transient() => {
                let delay = Duration::from_millis(500 * u64::from(attempt));
                tracing::warn!(attempt, %err, "transient error, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_then_succeeds() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, DbError> = with_retry(|| async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(DbError::Connection("connection refused".into()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, DbError> = with_retry(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(DbError::InvalidStatement("bad syntax".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
