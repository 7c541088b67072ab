//! Bounded retry combinator shared by every adapter

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound on any single backoff delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Exponential backoff: `base * 2^(attempt-1)`, capped at [`MAX_BACKOFF`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
}

impl ExponentialBackoff {
    /// Backoff starting at `base`
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            cap: MAX_BACKOFF,
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base
            .checked_mul(2u32.pow(exponent))
            .unwrap_or(self.cap)
            .min(self.cap)
    }

    /// Delay honouring a server hint, still capped
    pub fn delay_with_hint(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        hint.map(|h| h.min(self.cap))
            .unwrap_or_else(|| self.delay(attempt))
    }
}

/// Run `op` up to `max_attempts` times.
///
/// `op` receives the 1-based attempt number. After a failed attempt,
/// `is_retryable` decides whether to try again; if so the combinator sleeps
/// for `backoff(attempt, &error)` first. The last error is returned once the
/// bound is reached or an error is not retryable.
///
/// # Examples
///
/// ```
/// use docket_llm::retry::retry;
/// use std::time::Duration;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// let result: Result<u32, &str> = rt.block_on(retry(
///     4,
///     |attempt| async move { if attempt < 3 { Err("busy") } else { Ok(attempt) } },
///     |_, _| Duration::ZERO,
///     |_| true,
/// ));
/// assert_eq!(result, Ok(3));
/// ```
pub async fn retry<T, E, Op, Fut, B, R>(
    max_attempts: u32,
    mut op: Op,
    backoff: B,
    mut is_retryable: R,
) -> Result<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: Fn(u32, &E) -> Duration,
    R: FnMut(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts || !is_retryable(&error) {
                    return Err(error);
                }
                let delay = backoff(attempt, &error);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, max_attempts, error, delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
