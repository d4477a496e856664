//! LLM backend abstraction
//!
//! The [`LlmBackend`] trait is the capability interface every provider
//! implements. Backend failures are environmental and always surface as a
//! typed [`BackendError`]; callers treat them as recoverable per-asset
//! conditions, never as process-fatal.

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced at the backend boundary. These never escape a generation
/// step; generators convert them into per-asset failure statuses.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// API request failed with a non-success status.
    #[error("API error ({status_code}): {message}")]
    Api { message: String, status_code: u16 },

    /// Credentials rejected by the provider.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Request exceeded the client-side timeout ceiling.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Provider-side rate limiting.
    #[error("Rate limit exceeded{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Response arrived but could not be interpreted.
    #[error("Invalid response from LLM: {0}")]
    InvalidResponse(String),

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),
}

/// One generation request. The interface layer owns the token/temperature
/// policy; backends only apply the provider-specific thinking accommodation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Extended-thinking token budget. While set, backends force the
    /// generation temperature to 1.0; the two are not independently
    /// controllable.
    pub thinking_budget: Option<u32>,
}

/// Capability interface over LLM providers.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates text for the request. Environmental failures come back as
    /// `BackendError`; this method must not panic.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;

    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Model identifier in use.
    fn model_id(&self) -> &str;
}
