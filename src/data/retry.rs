//! Fixed-attempt retry with doubling backoff.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Treated as at least 1.
    pub attempts: u32,
    /// Delay before the second attempt; doubled for every attempt after that.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts (tests, or callers that pace themselves).
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            backoff: Duration::ZERO,
        }
    }

    /// Delay slept after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }
}

/// Outcome of a single failed attempt.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Worth retrying (transport error, 429, 5xx).
    Transient(String),
    /// Retrying cannot help (bad credentials, 4xx, unreadable body).
    Fatal(AppError),
}

/// Run `op` up to `policy.attempts` times.
///
/// `op` receives the 1-based attempt number. Fatal failures stop immediately;
/// the last transient failure becomes a runtime error.
pub fn with_retries<T>(
    policy: &RetryPolicy,
    what: &str,
    mut op: impl FnMut(u32) -> Result<T, Failure>,
) -> Result<T, AppError> {
    let attempts = policy.attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(Failure::Fatal(err)) => return Err(err),
            Err(Failure::Transient(message)) => {
                last = message;
                if attempt < attempts {
                    let delay = policy.delay_after(attempt);
                    warn!(%what, attempt, attempts, ?delay, error = %last, "attempt failed, retrying");
                    thread::sleep(delay);
                }
            }
        }
    }

    Err(AppError::runtime(format!(
        "{what} failed after {attempts} attempt(s): {last}"
    )))
}
