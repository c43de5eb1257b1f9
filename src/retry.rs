use crate::error::ClientError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

/// Exponential backoff for collaborator calls.
///
/// Only errors reporting [`ClientError::is_transient`] are repeated; a
/// rejected or undecodable response is returned on the first attempt.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn retry<F, Fut, T>(&self, operation: F) -> Result<T, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 0;
        let mut delay = self.config.initial_delay;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("Operation succeeded after {} attempts", attempt);
                    }
                    return Ok(result);
                }
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if attempt >= self.config.max_attempts.max(1) => {
                    warn!("Operation failed after {} attempts: {}", attempt, err);
                    return Err(err);
                }
                Err(err) => {
                    let wait = if self.config.jitter {
                        // Spread concurrent retries apart
                        delay + Duration::from_millis((rand::random::<f64>() * 250.0) as u64)
                    } else {
                        delay
                    };

                    warn!(
                        "Attempt {} failed: {}. Retrying in {:?}...",
                        attempt, err, wait
                    );
                    sleep(wait).await;

                    delay = Duration::from_secs_f64(
                        (delay.as_secs_f64() * self.config.multiplier)
                            .min(self.config.max_delay.as_secs_f64()),
                    );
                }
            }
        }
    }
}
