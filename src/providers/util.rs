use crate::core::error::FetchFailure;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retries an async operation a bounded number of times.
///
/// # Parameters
/// - `operation`: Closure returning a future, called with the 1-based attempt number
/// - `retries`: Total number of attempts; `0` still makes one attempt
/// - `delay_ms`: Milliseconds slept between attempts, never after the last one
///
/// # Returns
/// The first successful result, or a [`FetchFailure`] carrying the last error
/// once every attempt has failed. Individual failures are only logged.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: u32,
    delay_ms: u64,
) -> Result<T, FetchFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match operation(attempt).await {
            Ok(val) => {
                if attempt > 1 {
                    debug!("Attempt {}/{} succeeded", attempt, attempts);
                }
                return Ok(val);
            }
            Err(err) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, err);
                last_error = err.to_string();
            }
        }

        if attempt < attempts {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    error!("Giving up after {} attempt(s): {}", attempts, last_error);
    Err(FetchFailure {
        attempts,
        last_error,
    })
}
