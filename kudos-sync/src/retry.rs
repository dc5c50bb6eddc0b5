//! Deadlines and retry with backoff around network calls.

use crate::config::RetryPolicy;
use crate::error::{SyncError, SyncResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Runs `fut`, failing with [`SyncError::Timeout`] if it does not finish
/// within `timeout`.
pub async fn with_deadline<T, F>(timeout: Duration, fut: F) -> SyncResult<T>
where
    F: Future<Output = SyncResult<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| SyncError::Timeout(timeout))?
}

/// Calls `op` until it succeeds, returns a non-transient error, or the policy
/// runs out of attempts. Each attempt gets its own deadline.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    timeout: Duration,
    label: &str,
    mut op: F,
) -> SyncResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SyncResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match with_deadline(timeout, op()).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{label} failed (attempt {attempt}/{max_attempts}), retrying in {:?}: {e}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
