//! Bounded exponential backoff around model calls.
//!
//! Each failure is classified as retryable (transient overload, rate limit,
//! timeout) or fatal. Fatal failures stop immediately; retryable ones are
//! re-attempted after `min(base * 2^attempt, max)` milliseconds until the
//! attempt budget runs out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::errors::{ArticleflowError, CompletionError};
use crate::events::{names, EventSink, NoOpEventSink};

/// How a failure should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient; try again after a delay.
    Retryable,
    /// Permanent; surface immediately.
    Fatal,
}

/// Successful result of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// The value returned by the successful attempt.
    pub value: T,
    /// Total attempts made, including the successful one.
    pub attempts: u32,
}

impl<T> RetryOutcome<T> {
    /// Returns how many times the operation was re-attempted.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Retry policy for completion calls.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    retryable_messages: Vec<String>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Creates a policy from config.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        let retryable_messages = config
            .retryable_messages
            .iter()
            .map(|m| m.to_lowercase())
            .collect();
        Self {
            config,
            retryable_messages,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the sink that receives retry events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the config.
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Returns the backoff delay after the given zero-based attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.config.base_delay_ms;
        let delay = base.saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(delay.min(self.config.max_delay_ms))
    }

    /// Classifies a completion failure.
    #[must_use]
    pub fn classify(&self, error: &CompletionError) -> FailureClass {
        if let Some(status) = error.status {
            if self.config.retryable_status_codes.contains(&status) {
                return FailureClass::Retryable;
            }
        }

        let message = error.message.to_lowercase();
        if self
            .retryable_messages
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
        {
            FailureClass::Retryable
        } else {
            FailureClass::Fatal
        }
    }

    /// Runs `operation` until it succeeds, fails fatally, or exhausts the
    /// attempt budget.
    ///
    /// The final failure is translated into a stage-labeled error; `model`
    /// is used to word not-found failures.
    pub async fn run<T, F, Fut>(
        &self,
        stage: &str,
        model: &str,
        mut operation: F,
    ) -> Result<RetryOutcome<T>, ArticleflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CompletionError>>,
    {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt: u32 = 0;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    return Ok(RetryOutcome {
                        value,
                        attempts: attempt + 1,
                    })
                }
                Err(e) => e,
            };

            let class = self.classify(&error);
            let last_attempt = attempt + 1 >= max_attempts;

            if class == FailureClass::Fatal || last_attempt {
                warn!(
                    stage,
                    attempts = attempt + 1,
                    retryable = class == FailureClass::Retryable,
                    error = %error,
                    "Model call gave up"
                );
                return Err(error.into_stage_error(stage, model));
            }

            let delay = self.delay_for_attempt(attempt);
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            debug!(
                stage,
                attempt = attempt + 1,
                max_attempts,
                delay_ms,
                error = %error,
                "Retrying after error"
            );
            self.event_sink.try_emit(
                names::RETRY_SCHEDULED,
                Some(serde_json::json!({
                    "stage": stage,
                    "attempt": attempt + 1,
                    "delay_ms": delay_ms,
                    "error": error.to_string(),
                })),
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
