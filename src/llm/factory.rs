//! Provider selection and backend construction
//!
//! [`Provider`] is a closed enum; adding a backend means adding a variant
//! here. Credential resolution order is explicit flag, then environment,
//! then (for the region) the built-in default.

use crate::config::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_BEDROCK_MODEL, DEFAULT_BEDROCK_REGION,
    DEFAULT_MODEL_PLACEHOLDER, ENV_ANTHROPIC_API_KEY, ENV_AWS_REGION, ENV_BEDROCK_BEARER_TOKEN,
};
use crate::llm::anthropic::AnthropicBackend;
use crate::llm::backend::{BackendError, LlmBackend};
use crate::llm::bedrock::BedrockBackend;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    Bedrock,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Provider::Bedrock => DEFAULT_BEDROCK_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Bedrock => write!(f, "bedrock"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "bedrock" => Ok(Provider::Bedrock),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Configuration failures are fatal before any workflow step runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown provider: {0} (expected \"anthropic\" or \"bedrock\")")]
    UnknownProvider(String),

    #[error("Anthropic API key not found. Set {ENV_ANTHROPIC_API_KEY} or use --api-key")]
    MissingApiKey,

    #[error("Bedrock bearer token not found. Set {ENV_BEDROCK_BEARER_TOKEN}")]
    MissingBedrockToken,

    #[error("Backend initialization failed: {0}")]
    BackendInit(#[from] BackendError),
}

/// Optional credential overrides from the CLI.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    pub api_key: Option<String>,
    pub aws_region: Option<String>,
}

/// Resolves the effective model id for a provider.
///
/// The placeholder, an empty string, or a Bedrock model that is not a fully
/// qualified Anthropic id all resolve to the provider default.
pub fn resolve_model(provider: Provider, requested: &str) -> String {
    if requested.is_empty() || requested == DEFAULT_MODEL_PLACEHOLDER {
        let model = provider.default_model();
        info!(provider = %provider, model, "Using default model");
        return model.to_string();
    }

    if provider == Provider::Bedrock && !requested.contains("anthropic.") {
        let model = provider.default_model();
        warn!(
            requested,
            model, "Model does not look like a fully qualified Bedrock id, using default"
        );
        return model.to_string();
    }

    requested.to_string()
}

/// Builds the backend for a provider, resolving credentials.
pub fn create_backend(
    provider: Provider,
    model: String,
    options: &BackendOptions,
) -> Result<Arc<dyn LlmBackend>, ConfigError> {
    match provider {
        Provider::Anthropic => {
            let api_key = options
                .api_key
                .clone()
                .or_else(|| std::env::var(ENV_ANTHROPIC_API_KEY).ok())
                .filter(|k| !k.is_empty())
                .ok_or(ConfigError::MissingApiKey)?;

            Ok(Arc::new(AnthropicBackend::new(api_key, model)?))
        }
        Provider::Bedrock => {
            let region = options
                .aws_region
                .clone()
                .or_else(|| std::env::var(ENV_AWS_REGION).ok())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_BEDROCK_REGION.to_string());

            let token = std::env::var(ENV_BEDROCK_BEARER_TOKEN)
                .ok()
                .filter(|t| !t.is_empty())
                .ok_or(ConfigError::MissingBedrockToken)?;

            Ok(Arc::new(BedrockBackend::new(region, token, model)?))
        }
    }
}
