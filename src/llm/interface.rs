//! High-level generation interface
//!
//! [`LlmInterface`] owns the generation policy: template rendering, the token
//! ceiling coupled to thinking mode, dry-run short-circuiting and verbose
//! prompt recording. Backends only execute requests.
//!
//! The return type is deliberately two-layered:
//! `anyhow::Result<GenerationResult>`. The outer error is a programming
//! defect (template rendering failed) and aborts the asset. The inner
//! `Result<String, BackendError>` is environmental; generators turn it into
//! a per-asset failure status and the workflow keeps going.

use crate::analyzers::ProjectContext;
use crate::config::{
    DEFAULT_TEMPERATURE, MAX_TOKENS_THINKING_DISABLED, MAX_TOKENS_THINKING_ENABLED,
};
use crate::llm::backend::{BackendError, GenerationRequest, LlmBackend};
use crate::llm::prompts::{PromptTemplate, SYSTEM_PROMPT};
use crate::llm::recording::PromptRecorder;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Prompts longer than this trigger a size warning (roughly 75k tokens).
const PROMPT_LENGTH_WARNING_CHARS: usize = 75_000 * 3;

/// Outcome of one generation call, backend failures included.
pub type GenerationResult = Result<String, BackendError>;

pub struct LlmInterface {
    backend: Option<Arc<dyn LlmBackend>>,
    thinking_budget: Option<u32>,
    recorder: Option<Mutex<PromptRecorder>>,
}

impl LlmInterface {
    pub fn new(backend: Arc<dyn LlmBackend>, thinking_budget: Option<u32>) -> Self {
        Self {
            backend: Some(backend),
            thinking_budget,
            recorder: None,
        }
    }

    /// Interface that never touches the network; every call returns a
    /// deterministic placeholder.
    pub fn dry_run() -> Self {
        Self {
            backend: None,
            thinking_budget: None,
            recorder: None,
        }
    }

    /// Attaches a verbose-mode prompt recorder.
    pub fn with_recorder(mut self, recorder: PromptRecorder) -> Self {
        self.recorder = Some(Mutex::new(recorder));
        self
    }

    fn backend_label(&self) -> String {
        match &self.backend {
            Some(backend) => format!("{} ({})", backend.name(), backend.model_id()),
            None => "dry-run".to_string(),
        }
    }

    /// Renders the template and generates content.
    ///
    /// In dry-run mode this returns a placeholder beginning with the template
    /// identifier, after rendering (so rendering defects still surface) and
    /// recording.
    pub async fn generate_content(
        &self,
        template: PromptTemplate,
        context: &ProjectContext,
    ) -> Result<GenerationResult> {
        let prompt = template.render(context)?;

        let prompt_length = prompt.len();
        debug!(template = template.id(), chars = prompt_length, "Rendered prompt");
        if prompt_length > PROMPT_LENGTH_WARNING_CHARS {
            warn!(
                chars = prompt_length,
                "Prompt is very long, consider reducing input size"
            );
        }

        if let Some(recorder) = &self.recorder {
            if let Ok(mut recorder) = recorder.lock() {
                if let Err(e) = recorder.record(
                    template.id(),
                    &prompt,
                    SYSTEM_PROMPT,
                    &self.backend_label(),
                ) {
                    warn!(error = %e, "Failed to record prompt");
                }
            }
        }

        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                info!(
                    template = template.id(),
                    chars = prompt_length,
                    "Dry run, skipping LLM call"
                );
                return Ok(Ok(format!(
                    "{} dry-run placeholder: no content was generated",
                    template.id()
                )));
            }
        };

        let max_tokens = if self.thinking_budget.is_some() {
            MAX_TOKENS_THINKING_ENABLED
        } else {
            MAX_TOKENS_THINKING_DISABLED
        };

        let request = GenerationRequest {
            prompt,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens,
            temperature: DEFAULT_TEMPERATURE,
            thinking_budget: self.thinking_budget,
        };

        debug!(
            template = template.id(),
            max_tokens,
            thinking = self.thinking_budget.is_some(),
            backend = backend.name(),
            "Sending generation request"
        );

        match backend.generate(&request).await {
            Ok(content) => {
                debug!(template = template.id(), chars = content.len(), "Generation succeeded");
                Ok(Ok(content))
            }
            Err(e) => {
                warn!(template = template.id(), error = %e, "Generation failed");
                Ok(Err(e))
            }
        }
    }
}
