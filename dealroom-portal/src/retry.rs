//! Bounded retry with exponential backoff for persistence calls
//!
//! After the attempt budget is exhausted the terminal error surfaces to
//! the caller, who must treat the write state as unknown. The sleep is
//! cancel-safe, so a dropped request future aborts the loop promptly.

use std::time::Duration;

use crate::error::PortalError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }
}

pub async fn with_retry<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T, PortalError>
where
    F: FnMut() -> Result<T, PortalError>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying store operation");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            Err(err) => return Err(err),
        }
    }
}
