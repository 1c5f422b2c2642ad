use super::errors::AgentError;
use crate::infrastructure::model::ModelError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded exponential backoff around one upstream call. Only rate limiting
/// (status 429) is retried; every other failure surfaces on the first
/// attempt. Budget and schedule are explicit so tests can shrink them.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following `attempt` (1-based):
    /// `min(base · 2^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails fatally, or exhausts the
    /// attempt budget. At most one attempt is in flight at a time.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, AgentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        for attempt in 1..=self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => match error.transport_status() {
                    Some(429) if attempt < self.max_attempts => {
                        let delay = self.delay_for(attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Rate limit reached; backing off before retry"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    // Any other status, or 429 with the budget spent: the
                    // original error goes up unchanged.
                    Some(_) => return Err(AgentError::Model(error)),
                    // No transport status means the upstream failed in a way
                    // retrying cannot fix.
                    None => return Err(AgentError::Failed(error.to_string())),
                },
            }
        }
        // Unreachable given the arms above; kept as a terminal guard.
        Err(AgentError::Failed("exceeded max retries".to_string()))
    }
}
