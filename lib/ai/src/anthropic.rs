//! Anthropic Messages API backend.

use crate::backend::{LlmBackend, LlmRequest, LlmResponse, TokenUsage};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anthropic Messages API endpoint.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Required API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model for draft generation.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Request timeout. Draft generation is a single short completion.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default completion budget when the request does not set one.
const DEFAULT_MAX_TOKENS: u32 = 1500;

/// An LLM backend speaking the Anthropic Messages API.
pub struct AnthropicBackend {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Creates a new backend with the given API key and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be constructed.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "Anthropic API key is empty".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key,
            model: model.into(),
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<OutboundMessage<'a>>,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: ApiUsage,
    model: String,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system.as_deref(),
            temperature: request.temperature,
            messages: vec![OutboundMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else if e.is_connect() {
                    LlmError::ProviderUnavailable {
                        provider: "anthropic".to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    LlmError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                reason: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        let content = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| LlmError::ResponseParseFailed {
                reason: "response contained no content blocks".to_string(),
            })?;

        tracing::debug!(
            model = %parsed.model,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "anthropic call completed"
        );

        Ok(LlmResponse {
            content,
            usage: TokenUsage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
            model: parsed.model,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
