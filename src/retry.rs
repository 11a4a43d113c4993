use std::time::Duration;

use reqwest::StatusCode;

/// Upper bound on configured retries.
pub const MAX_RETRIES: u8 = 10;

/// Bounded exponential backoff for transient upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Clamps `retries` to [`MAX_RETRIES`].
    pub fn with_retries(retries: usize) -> Self {
        Self {
            retries: retries.min(usize::from(MAX_RETRIES)),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: usize) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as u32;
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Upper bound for a whole retried call when each attempt is capped at `per_attempt`.
    pub fn worst_case(&self, per_attempt: Duration) -> Duration {
        let attempts = u32::try_from(self.attempts()).unwrap_or(u32::MAX);
        (1..=self.retries).fold(per_attempt.saturating_mul(attempts), |total, retry| {
            total.saturating_add(self.backoff(retry))
        })
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}
