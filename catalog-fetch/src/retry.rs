//! Retry strategies for HTTP requests.

use reqwest::StatusCode;
use std::time::Duration;

/// Strategy for retrying failed requests.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Whether to double the delay on every retry.
    pub exponential_backoff: bool,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryStrategy {
    /// Creates a new retry strategy.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
            exponential_backoff: true,
            max_delay: Duration::from_secs(10),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Enables or disables exponential backoff.
    #[must_use]
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Sets the upper bound for any single delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculates the delay after a failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.base_delay.saturating_mul(factor)
        } else {
            self.base_delay
        };

        delay.min(self.max_delay)
    }

    /// Delay before retrying a throttled response. A server-provided
    /// `Retry-After` is honored up to `max_delay`.
    pub fn delay_for_status(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.map_or_else(|| self.delay_for_attempt(attempt), |delay| delay.min(self.max_delay))
    }

    /// Determines if a transport error should be retried.
    ///
    /// A connect error means the request never reached the server. A timeout
    /// may fire after the server acted, so it is only retried when
    /// `idempotent` is set.
    pub fn should_retry(&self, error: &reqwest::Error, idempotent: bool) -> bool {
        error.is_connect() || (idempotent && error.is_timeout())
    }

    /// Determines if a response status should be retried.
    ///
    /// Only throttling qualifies: the server rejected the request without
    /// processing it, so a retry is safe for every method.
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(3)
    }
}
