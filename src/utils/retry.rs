//! Exponential backoff for fallible async operations.

use crate::config::RetryPolicy;
use std::fmt::Display;
use std::future::Future;
use tokio::time::sleep;
use tracing::warn;

/// Runs `f` until it succeeds, the error is not retryable, or the policy's
/// retries are spent. Delays grow exponentially between attempts.
pub async fn with_backoff<F, Fut, T, E, P>(policy: &RetryPolicy, should_retry: P, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && should_retry(&e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient failure"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
