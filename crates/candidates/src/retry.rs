use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Exponential backoff settings for calls to external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Run `f` until it succeeds, sleeping between attempts with a doubling
    /// backoff. Gives up after `max_retries` retries with the last error.
    pub async fn retry<F, Fut, T, E>(&self, operation_name: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_backoff = Duration::from_millis(self.max_backoff_ms);
        let mut backoff = Duration::from_millis(self.initial_backoff_ms);
        let mut retries = 0;

        loop {
            let err = match f().await {
                Ok(result) if retries == 0 => return Ok(result),
                Ok(result) => {
                    info!(operation = operation_name, retries, "Succeeded after retrying");
                    return Ok(result);
                }
                Err(err) => err,
            };

            if retries == self.max_retries {
                warn!(operation = operation_name, retries, error = %err, "Giving up");
                return Err(err);
            }
            retries += 1;

            warn!(
                operation = operation_name,
                retry = retries,
                backoff_ms = backoff.as_millis() as u64,
                error = %err,
                "Call failed, retrying"
            );

            sleep(backoff).await;
            backoff = (backoff * 2).min(max_backoff);
        }
    }
}
