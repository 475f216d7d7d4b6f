//! Exponential backoff around a fallible async operation

use crate::config::UpstreamConfig;
use crate::utils::error::FetchError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a retried operation
#[derive(Debug)]
pub struct RetryOutcome<R> {
    pub result: std::result::Result<R, FetchError>,
    /// Attempts actually made, including the first
    pub attempts: u32,
    /// True when the last error was retryable but no retries were left
    pub exhausted: bool,
}

/// Retry policy: `1 + max_retries` attempts, the n-th retry waiting
/// `base_delay * 2^n` (n counted from 0)
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            jitter: false,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_delay(),
            jitter: config.jitter,
        }
    }

    pub fn with_max_retries(&self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self.clone()
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay slept after the failed attempt numbered `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent. `f` receives the 0-based attempt number.
    pub async fn call<F, Fut, R>(&self, mut f: F) -> RetryOutcome<R>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<R, FetchError>>,
    {
        let mut attempt = 0;

        loop {
            match f(attempt).await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Retry succeeded on attempt {}", attempt + 1);
                    }
                    return RetryOutcome {
                        result: Ok(result),
                        attempts: attempt + 1,
                        exhausted: false,
                    };
                }
                Err(error) if !error.is_retryable() => {
                    return RetryOutcome {
                        result: Err(error),
                        attempts: attempt + 1,
                        exhausted: false,
                    };
                }
                Err(error) => {
                    if attempt >= self.max_retries {
                        warn!("Giving up after {} attempts: {}", attempt + 1, error);
                        return RetryOutcome {
                            result: Err(error),
                            attempts: attempt + 1,
                            exhausted: true,
                        };
                    }

                    let delay = self.jittered(self.delay_for(attempt));
                    debug!(
                        "Attempt {} failed: {}, retrying in {:?}",
                        attempt + 1,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter {
            return delay;
        }
        let millis = delay.as_millis() as f64;
        let offset = millis * 0.1 * (rand::random::<f64>() - 0.5);
        Duration::from_millis((millis + offset).max(0.0) as u64)
    }
}
