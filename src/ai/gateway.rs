//! Model Gateway
//!
//! Sends prompts to the configured backend with bounded retry. Transient
//! failures (timeouts, 429, 5xx, empty bodies) are retried with exponential
//! backoff; the permanent misconfiguration class (400/401/403/404) fails
//! after a single attempt. On exhaustion the last error is returned as a
//! typed result; nothing escapes as a panic.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::provider::SharedProvider;
use crate::config::{LlmConfig, PipelineConfig};
use crate::constants::gateway as gateway_constants;
use crate::types::{CopycatError, Result};

/// Retry policy for a gateway
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per request
    pub max_attempts: u32,
    /// Base delay, doubled per failed attempt
    pub base_delay: Duration,
    /// Cap on the backoff delay
    pub max_delay: Duration,
    /// Per-attempt timeout
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: gateway_constants::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(gateway_constants::BASE_DELAY_MS),
            max_delay: Duration::from_secs(gateway_constants::MAX_DELAY_SECS),
            attempt_timeout: Duration::from_secs(
                crate::constants::network::DEFAULT_TIMEOUT_SECS,
            ),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(pipeline: &PipelineConfig, llm: &LlmConfig) -> Self {
        Self {
            max_attempts: pipeline.max_attempts,
            base_delay: Duration::from_millis(pipeline.base_delay_ms),
            max_delay: Duration::from_secs(gateway_constants::MAX_DELAY_SECS),
            attempt_timeout: Duration::from_secs(llm.timeout_secs),
        }
    }
}

/// Gateway wrapping a single backend with the retry policy
pub struct ModelGateway {
    provider: SharedProvider,
    policy: RetryPolicy,
}

impl ModelGateway {
    pub fn new(provider: SharedProvider, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Backend name for logging and provenance
    pub fn backend_name(&self) -> &str {
        self.provider.name()
    }

    /// Send a prompt, retrying per policy. Returns the raw response text or
    /// the last transport error once attempts are exhausted.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_error: Option<CopycatError> = None;

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.policy.base_delay, attempt, self.policy.max_delay);
                debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after backoff"
                );
                sleep(delay).await;
            }

            match self.attempt(prompt).await {
                Ok(text) => {
                    if text.trim().is_empty() {
                        // Empty body counts as a retryable failure, not a success
                        warn!(
                            backend = self.provider.name(),
                            attempt = attempt + 1,
                            "Empty response from backend"
                        );
                        last_error = Some(CopycatError::transport(format!(
                            "Empty response from {}",
                            self.provider.name()
                        )));
                        continue;
                    }
                    return Ok(text);
                }
                Err(err) => {
                    if !err.is_retryable() {
                        warn!(
                            backend = self.provider.name(),
                            error = %err,
                            "Permanent backend failure, not retrying"
                        );
                        return Err(err);
                    }
                    warn!(
                        backend = self.provider.name(),
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts,
                        error = %err,
                        "Backend attempt failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CopycatError::transport(format!(
                "{} failed after {} attempts",
                self.provider.name(),
                self.policy.max_attempts
            ))
        }))
    }

    /// One bounded attempt against the backend.
    async fn attempt(&self, prompt: &str) -> Result<String> {
        match tokio::time::timeout(self.policy.attempt_timeout, self.provider.complete(prompt))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(CopycatError::transport(format!(
                "{} timed out after {:?}",
                self.provider.name(),
                self.policy.attempt_timeout
            ))),
        }
    }
}

/// Exponential backoff with cap and small random jitter
fn backoff_delay(base: Duration, attempt: u32, max: Duration) -> Duration {
    let exp = base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
    let capped = std::cmp::min(exp, max);
    capped + random_jitter(capped)
}

/// Up to a quarter of the delay, from the thread-local RNG
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    let jitter_ms = rand::rng().random_range(0..max_jitter_ms);
    Duration::from_millis(jitter_ms)
}
