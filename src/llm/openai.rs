//! OpenAI-compatible chat-completion client
//!
//! Issues `POST {base_url}/chat/completions` with a bearer token and a single
//! user message, then extracts `choices[0].message.content`.

use super::{ChatGateway, GatewayError};
use crate::config::LlmConfig;
use crate::error::{AppError, AppResult};
use crate::itinerary::parser::preview;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum characters of an error body kept for logs
const MAX_BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Chat-completion gateway for OpenAI-compatible APIs
pub struct OpenAiGateway {
    client: reqwest::Client,
    completions_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout_seconds: u64,
}

impl OpenAiGateway {
    /// Create a gateway from configuration and an optional credential
    ///
    /// A missing credential is not an error here; every call will fail fast
    /// with [`GatewayError::MissingCredential`] instead.
    pub fn new(settings: &LlmConfig, api_key: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.timeout_seconds().min(10)))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build LLM HTTP client: {}", e)))?;

        Ok(Self {
            client,
            completions_url: format!(
                "{}/chat/completions",
                settings.base_url().trim_end_matches('/')
            ),
            model: settings.model().to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: settings.api_key_env().to_string(),
            timeout_seconds: settings.timeout_seconds(),
        })
    }

    /// Get the model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, api_key: &str, prompt: &str) -> Result<String, GatewayError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                body_preview: preview(&text, MAX_BODY_PREVIEW_CHARS),
            });
        }

        extract_content(&text)
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout {
                timeout_seconds: self.timeout_seconds,
            }
        } else {
            GatewayError::Network {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl ChatGateway for OpenAiGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!(
                env_var = %self.api_key_env,
                "LLM API credential is not configured, refusing to call the LLM service"
            );
            return Err(GatewayError::MissingCredential {
                env_var: self.api_key_env.clone(),
            });
        };

        tracing::debug!(
            model = %self.model,
            url = %self.completions_url,
            prompt_length = prompt.len(),
            timeout_seconds = self.timeout_seconds,
            "Sending chat completion request"
        );

        // The timeout covers connect, request, and reading the whole body.
        let timeout = Duration::from_secs(self.timeout_seconds);
        let content = tokio::time::timeout(timeout, self.send(api_key, prompt))
            .await
            .map_err(|_| GatewayError::Timeout {
                timeout_seconds: self.timeout_seconds,
            })??;

        tracing::info!(
            model = %self.model,
            content_length = content.len(),
            "Chat completion received"
        );
        Ok(content)
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Pull `choices[0].message.content` out of a response body
fn extract_content(body: &str) -> Result<String, GatewayError> {
    let envelope: CompletionEnvelope =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedEnvelope {
            reason: format!("response body is not a completion envelope: {}", e),
        })?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::MalformedEnvelope {
            reason: "`choices` is empty".to_string(),
        })?
        .message
        .and_then(|message| message.content)
        .ok_or_else(|| GatewayError::MalformedEnvelope {
            reason: "`choices[0].message.content` is missing".to_string(),
        })?;

    if content.trim().is_empty() {
        return Err(GatewayError::MalformedEnvelope {
            reason: "`choices[0].message.content` is empty".to_string(),
        });
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_from_valid_envelope() {
        let body = r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "こんにちは"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "こんにちは");
    }

    #[test]
    fn test_extract_content_rejects_empty_choices() {
        let err = extract_content(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_extract_content_rejects_missing_choices() {
        let err = extract_content(r#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_extract_content_rejects_missing_message_content() {
        for body in [
            r#"{"choices": [{}]}"#,
            r#"{"choices": [{"message": {}}]}"#,
            r#"{"choices": [{"message": {"content": null}}]}"#,
            r#"{"choices": [{"message": {"content": "  "}}]}"#,
        ] {
            let err = extract_content(body).unwrap_err();
            assert!(
                matches!(err, GatewayError::MalformedEnvelope { .. }),
                "{body} should be a malformed envelope"
            );
        }
    }

    #[test]
    fn test_extract_content_rejects_non_json() {
        let err = extract_content("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_request_body_shape() {
        let body = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: [UserMessage {
                role: "user",
                content: "hello",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        // base_url points nowhere; the call must fail before any connection attempt
        let settings: LlmConfig = toml::from_str(
            r#"
base_url = "http://127.0.0.1:1/v1"
api_key_env = "TRIPNAVI_TEST_KEY"
"#,
        )
        .unwrap();
        let gateway = OpenAiGateway::new(&settings, None).unwrap();
        assert!(!gateway.has_credential());

        let err = gateway.complete("prompt").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::MissingCredential {
                env_var: "TRIPNAVI_TEST_KEY".to_string()
            }
        );
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let settings = LlmConfig::default();
        let gateway = OpenAiGateway::new(&settings, Some("   ".to_string())).unwrap();
        assert!(!gateway.has_credential());
    }
}
