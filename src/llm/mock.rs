//! Scriptable in-memory backend for tests

use crate::llm::backend::{BackendError, GenerationRequest, LlmBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Backend that replays scripted responses and records every request.
///
/// Responses are consumed in order; once the script is exhausted the
/// fallback response repeats.
pub struct MockBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    fallback: Result<String, BackendError>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    /// Backend that always returns `response`.
    pub fn with_response(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(response.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend that always fails with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(BackendError::Api {
                message: message.to_string(),
                status_code: 500,
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend that replays `responses` in order, then repeats the last one.
    pub fn with_script(responses: Vec<Result<String, BackendError>>) -> Self {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        Self {
            script: Mutex::new(responses.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests seen so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or_else(|| self.fallback.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "p".to_string(),
            system_prompt: "s".to_string(),
            max_tokens: 100,
            temperature: 0.3,
            thinking_budget: None,
        }
    }

    #[tokio::test]
    async fn test_script_then_fallback() {
        let backend = MockBackend::with_script(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
        ]);

        assert_eq!(backend.generate(&request()).await.unwrap(), "first");
        assert_eq!(backend.generate(&request()).await.unwrap(), "second");
        assert_eq!(backend.generate(&request()).await.unwrap(), "second");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = MockBackend::failing("boom");
        assert!(backend.generate(&request()).await.is_err());
    }
}
