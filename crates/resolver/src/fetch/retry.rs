// Retry loop shared by every fetch: fixed attempt budget, linear backoff and
// definitive-failure short-circuit.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// The wait after the n-th failed attempt (0-indexed) is `(n + 1) * backoff_step`.
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(2_000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (0-indexed).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step
            .checked_mul(attempt.saturating_add(1))
            .unwrap_or(Duration::MAX)
    }
}

/// Outcome of a single attempt.
pub enum RetryAction<T> {
    Success(T),
    /// Transient failure (timeout, connection reset, 5xx).
    Retry(String),
    /// Definitive failure; no further attempts are made.
    Stop(String),
}

/// Runs `operation` until it succeeds, stops, or the attempt budget is spent.
///
/// The closure receives the 0-indexed attempt number. Exhaustion and definitive
/// failures both yield `None`.
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Option<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = RetryAction<T>>,
{
    for attempt in 0..policy.max_attempts {
        match operation(attempt).await {
            RetryAction::Success(value) => return Some(value),
            RetryAction::Stop(reason) => {
                debug!(attempt = attempt + 1, %reason, "Definitive failure, not retrying");
                return None;
            }
            RetryAction::Retry(reason) => {
                if attempt + 1 >= policy.max_attempts {
                    warn!(
                        attempts = policy.max_attempts,
                        %reason,
                        "Retry budget exhausted"
                    );
                    return None;
                }
                let delay = policy.delay_after_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    max = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    %reason,
                    "Retrying after transient error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    None
}
