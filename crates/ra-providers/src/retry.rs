//! Per-call timeouts and bounded retries for any provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use ra_core::{CompletionRequest, CompletionResponse, Error, Provider, StreamResult};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on every further attempt.
    pub base_delay: Duration,
    /// Upper bound for a single model call.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Backoff before attempt `attempt + 1`, where `attempt` starts at 1.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.pow(attempt.saturating_sub(1).min(5));
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

/// Wraps a provider so that every call is bounded by a timeout and transient
/// failures are retried with exponential backoff.
pub struct RetryProvider {
    inner: Arc<dyn Provider>,
    policy: RetryPolicy,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, Error>>,
    {
        let mut attempt = 1;
        loop {
            let result = match tokio::time::timeout(self.policy.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(Error::timeout(format!(
                    "{} call exceeded {:?}",
                    operation, self.policy.timeout
                ))),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "{} failed, retrying",
                        operation
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn default_model(&self) -> Option<&str> {
        self.inner.default_model()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        self.attempt("complete", || self.inner.complete(request.clone()))
            .await
    }

    /// Only opening the stream is retried; errors after the first chunk are
    /// passed through to the consumer.
    async fn stream(&self, request: CompletionRequest) -> Result<StreamResult, Error> {
        self.attempt("stream", || self.inner.stream(request.clone()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ra_core::testing::MockProvider;
    use ra_core::Message;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1))
            .with_timeout(Duration::from_secs(5))
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("summarize")])
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default().with_base_delay(Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(40), Duration::from_millis(3200));
    }

    #[test]
    fn test_backoff_saturates_on_huge_base_delay() {
        let policy = RetryPolicy::default().with_base_delay(Duration::from_secs(u64::MAX / 2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(u64::MAX / 2));
        assert_eq!(policy.delay_for(3), Duration::MAX);
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let mock = Arc::new(MockProvider::new());
        mock.queue_error(Error::rate_limit("slow down"));
        mock.queue_error(Error::network("connection reset"));
        mock.queue_response("done");

        let provider = RetryProvider::new(mock.clone(), fast_policy());
        let response = provider.complete(request()).await.unwrap();

        assert_eq!(response.text(), "done");
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mock = Arc::new(MockProvider::new());
        for _ in 0..3 {
            mock.queue_error(Error::network("down"));
        }
        mock.queue_response("never reached");

        let provider = RetryProvider::new(mock.clone(), fast_policy());
        let err = provider.complete(request()).await.unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_auth_errors() {
        let mock = Arc::new(MockProvider::new());
        mock.queue_error(Error::auth("invalid key"));
        mock.queue_response("unused");

        let provider = RetryProvider::new(mock.clone(), fast_policy());
        let err = provider.complete(request()).await.unwrap_err();

        assert!(err.is_auth_error());
        assert_eq!(mock.request_count(), 1);
    }

    struct SlowProvider;

    #[async_trait]
    impl Provider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        fn default_model(&self) -> Option<&str> {
            None
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, Error> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(Error::Unknown("unreachable".to_string()))
        }

        async fn stream(&self, _request: CompletionRequest) -> Result<StreamResult, Error> {
            Err(Error::Unknown("unsupported".to_string()))
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let policy = fast_policy()
            .with_max_attempts(2)
            .with_timeout(Duration::from_millis(20));
        let provider = RetryProvider::new(Arc::new(SlowProvider), policy);

        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }
}
