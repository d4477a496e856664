//! AWS Bedrock backend for Anthropic models
//!
//! Talks to the Bedrock runtime HTTP API with a bearer token
//! (`AWS_BEARER_TOKEN_BEDROCK`). The request body follows the Anthropic
//! Messages schema with the `anthropic_version` marker Bedrock expects.

use crate::config::REQUEST_TIMEOUT_SECS;
use crate::llm::backend::{BackendError, GenerationRequest, LlmBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Backend invoking Anthropic models through AWS Bedrock.
pub struct BedrockBackend {
    region: String,
    bearer_token: String,
    model: String,
    http_client: Client,
    timeout: Duration,
}

impl BedrockBackend {
    pub fn new(
        region: String,
        bearer_token: String,
        model: String,
    ) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            region,
            bearer_token,
            model,
            http_client,
            timeout,
        })
    }

    fn invoke_url(&self) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/invoke",
            self.region, self.model
        )
    }
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
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
struct InvokeResponse {
    #[serde(default)]
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
impl LlmBackend for BedrockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        // Same thinking accommodation as the direct API.
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

        let body = InvokeRequest {
            anthropic_version: BEDROCK_ANTHROPIC_VERSION,
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
            region = %self.region,
            max_tokens = request.max_tokens,
            "Invoking model via Bedrock"
        );

        let response = self
            .http_client
            .post(self.invoke_url())
            .bearer_auth(&self.bearer_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(seconds = self.timeout.as_secs(), "Bedrock request timed out");
                    BackendError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    error!(error = %e, "Bedrock request failed");
                    BackendError::Network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body_text, "Bedrock returned error status");

            return Err(match status.as_u16() {
                401 | 403 => BackendError::Auth(format!("HTTP {status}: {body_text}")),
                429 => BackendError::RateLimited { retry_after: None },
                code => BackendError::Api {
                    message: format!("HTTP {status}: {body_text}"),
                    status_code: code,
                },
            });
        }

        let api_response: InvokeResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("JSON parse error: {e}")))?;

        let content: String = api_response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.is_empty() {
            warn!("No text content in Bedrock response");
        }

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "bedrock"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_url_includes_region_and_model() {
        let backend = BedrockBackend::new(
            "us-west-2".to_string(),
            "token".to_string(),
            "us.anthropic.claude-3-7-sonnet-20250219-v1:0".to_string(),
        )
        .unwrap();

        assert_eq!(
            backend.invoke_url(),
            "https://bedrock-runtime.us-west-2.amazonaws.com/model/us.anthropic.claude-3-7-sonnet-20250219-v1:0/invoke"
        );
    }

    #[test]
    fn test_request_carries_bedrock_version_marker() {
        let body = InvokeRequest {
            anthropic_version: BEDROCK_ANTHROPIC_VERSION,
            max_tokens: 8_000,
            temperature: 0.3,
            system: "sys",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            thinking: None,
        };

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("bedrock-2023-05-31"));
        assert!(!json.contains("\"model\""));
    }
}
