use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{ApiError, ApiErrorKind, Error};
use crate::Result;

/// Attempt budget, per-attempt timeout and linear-with-jitter backoff shared
/// by every upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
    pub timeout: Option<Duration>,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
            max_jitter: Duration::ZERO,
            timeout: None,
        }
    }

    /// 3 attempts, 2s base delay, 15s per request.
    pub const fn news_api() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(2),
            max_jitter: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(15)),
        }
    }

    /// 2 attempts, 3s base delay, 45s per request.
    pub const fn language_model() -> Self {
        Self {
            attempts: 2,
            base_delay: Duration::from_secs(3),
            max_jitter: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(45)),
        }
    }

    /// No waiting between attempts and no timeout.
    pub const fn immediate(attempts: u32) -> Self {
        Self::new(attempts, Duration::ZERO)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Wait before the attempt following `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        };
        self.base_delay * attempt + jitter
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// budget is spent. The closure receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, context: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match self.attempt(context, op(attempt)).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            warn!(context, attempt, attempts, error = %err, "attempt failed");

            if attempt >= attempts {
                return Err(Error::RetryExhausted {
                    context: context.to_string(),
                    attempts,
                    source: Box::new(err),
                });
            }

            tokio::time::sleep(self.delay_for(attempt)).await;
            attempt += 1;
        }
    }

    async fn attempt<T, Fut>(&self, context: &str, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::new(
                    ApiErrorKind::Timeout,
                    format!("{} request timed out after {}s", context, limit.as_secs_f32()),
                )
                .into()),
            },
            None => fut.await,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::news_api()
    }
}
