//! Retry/Backoff Policy — bounded retries for one model invocation.
//!
//! Retries fire only for the overloaded class; auth, quota, and
//! malformed-request failures propagate on the first occurrence. The
//! backoff sleep happens before each retry, never after the final failure,
//! and is cancel-safe: dropping the future aborts mid-backoff.

use std::future::Future;
use std::time::Duration;

use modelrelay_providers::ProviderError;

/// Base delay doubled on each successive retry.
const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Backoff before retry number `attempt` (0-based): `2^attempt * 1s`.
pub fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.saturating_pow(attempt)
}

/// Invoke `model` with up to `max_retries` additional attempts on
/// overload-class failures.
///
/// Attempt numbers are contiguous from 0 and bounded by `max_retries`;
/// the total number of invocations is at most `max_retries + 1`.
pub async fn invoke_with_retry<F, Fut>(
    model: &str,
    max_retries: u32,
    mut invoke: F,
) -> Result<String, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match invoke().await {
            Ok(text) => {
                if attempt > 0 {
                    tracing::info!(model, attempt, "Model call succeeded after retry");
                }
                return Ok(text);
            }
            Err(err) if err.is_retryable() && attempt < max_retries => {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    model,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Model overloaded, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
