//! Transparent retry wrapper for LLM clients
//!
//! Applies the configured retry policy to every outbound request: only the
//! designated HTTP status codes are retried, with exponential backoff; any
//! other error propagates immediately.

use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmClient};
use crate::agents::error::{LlmError, LlmResult};

/// Immutable retry configuration applied uniformly to model requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts total (first try included)
    pub attempts: u32,
    /// Exponential backoff base
    pub exp_base: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// HTTP status codes considered retryable
    pub retryable_status: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            exp_base: 2,
            initial_delay: Duration::from_secs(1),
            retryable_status: vec![429, 500, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Whether the error should be retried under this policy
    pub fn is_retryable(&self, error: &LlmError) -> bool {
        match error {
            LlmError::Api { status, .. } => self.retryable_status.contains(status),
            _ => false,
        }
    }

    /// Backoff delay after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.exp_base.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

/// LLM client wrapper that retries retryable failures with backoff
pub struct Retrying<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> Retrying<C> {
    /// Wrap a client with the given retry policy
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for Retrying<C> {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let mut attempt = 1u32;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(error) if attempt < self.policy.attempts && self.policy.is_retryable(&error) => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retryable LLM error, backing off: {}",
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::domain::Message;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Client scripted with a queue of outcomes, one per attempt
    struct ScriptedClient {
        outcomes: Mutex<Vec<Result<String, u16>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedClient {
        fn new(outcomes: Vec<Result<String, u16>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
            *self.calls.lock().unwrap() += 1;
            let outcome = self.outcomes.lock().unwrap().remove(0);
            match outcome {
                Ok(text) => Ok(CompletionResponse {
                    message: Message::assistant(text),
                    usage: None,
                }),
                Err(status) => Err(LlmError::Api {
                    status,
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_fifth_attempt_with_exponential_backoff() {
        let inner = ScriptedClient::new(vec![
            Err(503),
            Err(503),
            Err(503),
            Err(503),
            Ok("ok".to_string()),
        ]);
        let client = Retrying::new(inner, RetryPolicy::default());

        let start = Instant::now();
        let response = client.complete(CompletionRequest::default()).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(response.text(), "ok");
        assert_eq!(client.inner.calls(), 5);
        // Delays 1 + 2 + 4 + 8 seconds under paused time
        assert_eq!(elapsed.as_secs(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_status_propagates_immediately() {
        let inner = ScriptedClient::new(vec![Err(400)]);
        let client = Retrying::new(inner, RetryPolicy::default());

        let start = Instant::now();
        let error = client
            .complete(CompletionRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(error, LlmError::Api { status: 400, .. }));
        assert_eq!(client.inner.calls(), 1);
        assert_eq!(start.elapsed().as_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_last_error() {
        let inner = ScriptedClient::new(vec![Err(429); 5]);
        let client = Retrying::new(inner, RetryPolicy::default());

        let error = client
            .complete(CompletionRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(error, LlmError::Api { status: 429, .. }));
        assert_eq!(client.inner.calls(), 5);
    }

    #[test]
    fn delay_schedule_is_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(4));
        assert_eq!(policy.delay_after(4), Duration::from_secs(8));
    }
}
