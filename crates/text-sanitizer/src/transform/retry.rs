use super::{RateLimiter, TextTransformer, TransformOutcome, TransformRequest};
use crate::config::RetryConfig;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Bounded retry with exponential backoff for a single service call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): doubles from
    /// `initial_delay`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_secs(config.initial_delay_seconds),
            max_delay: Duration::from_secs(config.max_delay_seconds),
        }
    }
}

/// Rate-limited, retrying wrapper around the transformation service.
#[derive(Clone)]
pub struct RetryingInvoker {
    transformer: Arc<dyn TextTransformer>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl RetryingInvoker {
    pub fn new(
        transformer: Arc<dyn TextTransformer>,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transformer,
            limiter,
            policy,
        }
    }

    /// Transform one chunk. Returns the text to keep and whether the service
    /// actually transformed it; a policy rejection keeps the original text.
    pub async fn invoke(&self, chunk: &str, position: usize, total: usize) -> Result<(String, bool)> {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            self.limiter.acquire().await;
            info!("Processing chunk {} of {} (attempt {})", position, total, attempt);

            let request = TransformRequest {
                text: chunk.to_string(),
                position,
                total,
            };

            match self.transformer.transform(request).await {
                Ok(TransformOutcome::Cleaned(text)) => return Ok((text, true)),
                Ok(TransformOutcome::Rejected) => {
                    warn!("Chunk {} rejected by content policy, keeping original text", position);
                    return Ok((chunk.to_string(), false));
                }
                Err(e) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "Service error for chunk {} (attempt {}/{}): {}. Retrying in {:?}",
                        position, attempt, self.policy.max_attempts, e, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        "Service error for chunk {} after {} attempts: {}",
                        position, attempt, e
                    );
                    return Err(e);
                }
            }
        }
    }
}
