//! Bounded retry with a fixed delay.
//!
//! Teardown traffic is low volume, so attempts are spaced by a constant
//! delay instead of exponential backoff.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (minimum 1)
    pub max_attempts: u32,
    /// Delay between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt count and default delay
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self::default().with_max_attempts(max_attempts)
    }

    /// Set maximum attempts
    #[must_use]
    pub const fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = if max == 0 { 1 } else { max };
        self
    }

    /// Set the delay between attempts
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Single attempt, no delay
    #[must_use]
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Default attempt count with no delay
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] with the last error once every attempt failed.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<Retried<T>, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    return Ok(Retried {
                        value,
                        attempts: attempt,
                    })
                }
                Err(last_error) if attempt >= max => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error,
                    })
                }
                Err(_) => {
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Successful outcome of a retried operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    /// Value produced by the successful attempt
    pub value: T,
    /// Attempts used
    pub attempts: u32,
}

/// Every attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Attempts made
    pub attempts: u32,
    /// Error from the final attempt
    pub last_error: E,
}
