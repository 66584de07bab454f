//! Chat-completion gateway
//!
//! [`ChatGateway`] is the seam between request handlers and the third-party
//! LLM service. The production implementation is [`openai::OpenAiGateway`];
//! tests substitute mock gateways that make no network calls.

use async_trait::async_trait;

pub mod openai;
pub mod retry;

pub use openai::OpenAiGateway;
pub use retry::{RetryPolicy, complete_with_retry};

/// Trait for chat-completion backends
///
/// One call sends one user-role message and yields the reply text.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send `prompt` as a single user message and return the reply content
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Whether an API credential is available
    fn has_credential(&self) -> bool;
}

/// Coarse classification of gateway failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Missing credential or other local misconfiguration; alert-worthy
    Config,
    /// Transport failure or timeout; no response was received
    Network,
    /// Response received with a non-2xx status
    UpstreamStatus,
    /// 2xx response without usable `choices[0].message.content`
    MalformedEnvelope,
}

impl GatewayErrorKind {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayErrorKind::Config => "config",
            GatewayErrorKind::Network => "network",
            GatewayErrorKind::UpstreamStatus => "upstream_status",
            GatewayErrorKind::MalformedEnvelope => "malformed_envelope",
        }
    }
}

/// Errors from a chat-completion call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No API credential was configured; no request was sent
    #[error("LLM API credential is not configured (set the {env_var} environment variable)")]
    MissingCredential { env_var: String },

    /// Connection, TLS, or body transfer failure
    #[error("LLM request failed before a response was received: {reason}")]
    Network { reason: String },

    /// No complete response within the per-attempt timeout
    #[error("LLM request timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Upstream answered with a non-success status
    #[error("LLM service returned HTTP {status}: {body_preview}")]
    UpstreamStatus { status: u16, body_preview: String },

    /// Upstream answered 2xx but the envelope had no usable content
    #[error("LLM response envelope is malformed: {reason}")]
    MalformedEnvelope { reason: String },
}

impl GatewayError {
    /// Classify this error
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::MissingCredential { .. } => GatewayErrorKind::Config,
            GatewayError::Network { .. } | GatewayError::Timeout { .. } => {
                GatewayErrorKind::Network
            }
            GatewayError::UpstreamStatus { .. } => GatewayErrorKind::UpstreamStatus,
            GatewayError::MalformedEnvelope { .. } => GatewayErrorKind::MalformedEnvelope,
        }
    }

    /// Returns true only for transport-level failures
    ///
    /// Once a response has been received, asking again is unlikely to change
    /// the outcome, and a missing credential never fixes itself.
    pub fn is_retryable(&self) -> bool {
        self.kind() == GatewayErrorKind::Network
    }
}
