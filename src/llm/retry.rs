//! Bounded retry around a gateway call
//!
//! Only transport failures are retried. A received response (error status or
//! malformed envelope) and a missing credential are returned immediately.

use super::{ChatGateway, GatewayError};
use crate::middleware::RequestId;
use std::time::Duration;

/// Default number of attempts (first try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
/// Default base backoff in milliseconds (doubles each retry)
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
/// Upper bound on any single backoff sleep
pub const MAX_BACKOFF_MS: u64 = 5_000;

/// Retry settings for gateway calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a retry policy
    ///
    /// # Errors
    /// Returns an error if `max_attempts` is 0 (at least 1 attempt is required)
    pub fn new(max_attempts: u32, backoff_ms: u64) -> Result<Self, &'static str> {
        if max_attempts == 0 {
            return Err("max_attempts must be at least 1");
        }
        Ok(Self {
            max_attempts,
            backoff_ms,
        })
    }

    /// Get the maximum number of attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the base backoff in milliseconds
    pub fn backoff_ms(&self) -> u64 {
        self.backoff_ms
    }

    /// Backoff before the attempt following `attempt` (1-indexed)
    ///
    /// `base * 2^(attempt-1)`, capped at [`MAX_BACKOFF_MS`].
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let millis = self
            .backoff_ms
            .saturating_mul(2_u64.saturating_pow(exponent))
            .min(MAX_BACKOFF_MS);
        Duration::from_millis(millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

/// Call the gateway, retrying transport failures up to the policy's limit
pub async fn complete_with_retry(
    gateway: &dyn ChatGateway,
    prompt: &str,
    policy: &RetryPolicy,
    request_id: RequestId,
) -> Result<String, GatewayError> {
    let mut attempt = 1;
    loop {
        match gateway.complete(prompt).await {
            Ok(content) => return Ok(content),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts() => {
                let backoff = policy.backoff_after(attempt);
                tracing::warn!(
                    request_id = %request_id,
                    attempt = attempt,
                    max_attempts = policy.max_attempts(),
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "LLM call failed in transport, retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    error_kind = e.kind().as_str(),
                    "LLM call failed, not retrying"
                );
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Gateway replaying a scripted sequence of results
    struct ScriptedGateway {
        script: Mutex<Vec<Result<String, GatewayError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGateway {
        fn new(mut script: Vec<Result<String, GatewayError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("fallback".to_string()))
        }

        fn has_credential(&self) -> bool {
            true
        }
    }

    fn network_error() -> GatewayError {
        GatewayError::Network {
            reason: "connection reset".to_string(),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, 1).unwrap()
    }

    #[test]
    fn test_policy_rejects_zero_attempts() {
        assert!(RetryPolicy::new(0, 100).is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100).unwrap();
        assert_eq!(policy.backoff_after(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_after(40), Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[test]
    fn test_backoff_survives_extreme_values() {
        let policy = RetryPolicy::new(3, u64::MAX).unwrap();
        assert_eq!(policy.backoff_after(u32::MAX), Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[tokio::test]
    async fn test_network_failure_is_retried_once() {
        let gateway = ScriptedGateway::new(vec![Err(network_error()), Ok("route".to_string())]);
        let result = complete_with_retry(&gateway, "p", &fast_policy(2), RequestId::new()).await;
        assert_eq!(result.unwrap(), "route");
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_retries_stop_at_max_attempts() {
        let gateway = ScriptedGateway::new(vec![
            Err(network_error()),
            Err(network_error()),
            Ok("too late".to_string()),
        ]);
        let result = complete_with_retry(&gateway, "p", &fast_policy(2), RequestId::new()).await;
        assert_eq!(result.unwrap_err(), network_error());
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_upstream_status_is_not_retried() {
        let gateway = ScriptedGateway::new(vec![Err(GatewayError::UpstreamStatus {
            status: 500,
            body_preview: "boom".to_string(),
        })]);
        let result = complete_with_retry(&gateway, "p", &fast_policy(3), RequestId::new()).await;
        assert!(matches!(result, Err(GatewayError::UpstreamStatus { .. })));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_envelope_and_missing_credential_are_not_retried() {
        for error in [
            GatewayError::MalformedEnvelope {
                reason: "empty".to_string(),
            },
            GatewayError::MissingCredential {
                env_var: "OPENAI_API_KEY".to_string(),
            },
        ] {
            let gateway = ScriptedGateway::new(vec![Err(error.clone())]);
            let result =
                complete_with_retry(&gateway, "p", &fast_policy(3), RequestId::new()).await;
            assert_eq!(result.unwrap_err(), error);
            assert_eq!(gateway.calls(), 1);
        }
    }
}
