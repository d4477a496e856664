//! LLM-driven research question generation

use crate::analyzers::ProjectContext;
use crate::llm::{extract_json_block, LlmInterface, PromptTemplate};
use tracing::{error, info, warn};

/// Generates research questions from the project context.
pub struct QuestionGenerator<'a> {
    llm: &'a LlmInterface,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(llm: &'a LlmInterface) -> Self {
        Self { llm }
    }

    /// Asks the LLM for research questions. Every failure mode (backend
    /// error, non-JSON response, wrong shape) degrades to an empty list.
    pub async fn generate_questions(&self, context: &ProjectContext) -> Vec<String> {
        let result = match self
            .llm
            .generate_content(PromptTemplate::ResearchQuestions, context)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Failed to render research question prompt");
                return Vec::new();
            }
        };

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "LLM failed to generate research questions");
                return Vec::new();
            }
        };

        let questions: Vec<String> = match serde_json::from_str(extract_json_block(&raw)) {
            Ok(questions) => questions,
            Err(e) => {
                warn!(error = %e, "Research question response was not a JSON list of strings");
                return Vec::new();
            }
        };

        info!(count = questions.len(), "Generated research questions");
        questions
    }
}
