//! Anthropic Messages API backend

use crate::config::REQUEST_TIMEOUT_SECS;
use crate::llm::backend::{BackendError, GenerationRequest, LlmBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

const API_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
/// Beta header required for large outputs in thinking mode.
const THINKING_BETA: &str = "output-128k-2025-02-19";

/// Backend talking to the Anthropic Messages API directly.
pub struct AnthropicBackend {
    api_key: String,
    model: String,
    http_client: Client,
    timeout: Duration,
}

impl AnthropicBackend {
    pub fn new(api_key: String, model: String) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            model,
            http_client,
            timeout,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<ThinkingConfig>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ThinkingConfig {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let url = format!("{API_BASE_URL}/v1/messages");

        // Thinking mode forces temperature to 1.0; the API rejects other values.
        let (temperature, thinking) = match request.thinking_budget {
            Some(budget) => (
                1.0,
                Some(ThinkingConfig {
                    kind: "enabled",
                    budget_tokens: budget,
                }),
            ),
            None => (request.temperature, None),
        };

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature,
            system: &request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            thinking,
        };

        debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            thinking = request.thinking_budget.is_some(),
            "Sending request to Anthropic API"
        );

        let mut http_request = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        if request.thinking_budget.is_some() {
            http_request = http_request.header("anthropic-beta", THINKING_BETA);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!(seconds = self.timeout.as_secs(), "Anthropic request timed out");
                BackendError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                error!(error = %e, "Anthropic request failed");
                BackendError::Network(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body_text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body_text, "Anthropic API returned error status");

            return Err(match status.as_u16() {
                401 | 403 => BackendError::Auth(format!("HTTP {status}: {body_text}")),
                429 => BackendError::RateLimited { retry_after },
                code => BackendError::Api {
                    message: format!("HTTP {status}: {body_text}"),
                    status_code: code,
                },
            });
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("JSON parse error: {e}")))?;

        // Thinking blocks precede text blocks; only text blocks carry output.
        let content: String = api_response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.is_empty() {
            warn!("No text content in Anthropic response");
        }

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
