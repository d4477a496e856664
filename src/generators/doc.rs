//! Documentation generators: CLAUDE.md and the action plan

use crate::analyzers::ProjectContext;
use crate::config::{ACTION_PLAN_PATH, CLAUDE_MD_PATH};
use crate::fs::ProjectFs;
use crate::generators::GenerationStatus;
use crate::llm::{LlmInterface, PromptTemplate};
use anyhow::Result;
use tracing::{error, info};

/// Generates the Markdown documentation assets.
pub struct DocGenerator<'a> {
    llm: &'a LlmInterface,
    fs: &'a ProjectFs,
}

impl<'a> DocGenerator<'a> {
    pub fn new(llm: &'a LlmInterface, fs: &'a ProjectFs) -> Self {
        Self { llm, fs }
    }

    /// Generates CLAUDE.md from the project context.
    pub async fn generate_claude_md(&self, context: &ProjectContext) -> Result<GenerationStatus> {
        if self.fs.file_exists(CLAUDE_MD_PATH) && !self.fs.force_overwrite() {
            info!(path = CLAUDE_MD_PATH, "File exists, skipping");
            return Ok(GenerationStatus::skipped("already exists"));
        }

        info!(path = CLAUDE_MD_PATH, "Generating content");
        let content = match self
            .llm
            .generate_content(PromptTemplate::ClaudeMd, context)
            .await?
        {
            Ok(content) => content,
            Err(e) => {
                error!(path = CLAUDE_MD_PATH, error = %e, "Generation failed");
                return Ok(GenerationStatus::failed(e));
            }
        };

        if self.fs.write_file(CLAUDE_MD_PATH, &content) {
            info!(path = CLAUDE_MD_PATH, "Generated successfully");
            Ok(GenerationStatus::success())
        } else {
            Ok(GenerationStatus::failed(format!(
                "could not write {CLAUDE_MD_PATH}"
            )))
        }
    }

    /// Generates the action plan, selecting the squad or single-session
    /// template from the context. `output_override` replaces the default
    /// output path when set.
    pub async fn generate_action_plan(
        &self,
        context: &ProjectContext,
        output_override: Option<&str>,
    ) -> Result<GenerationStatus> {
        let output_path = output_override.unwrap_or(ACTION_PLAN_PATH);

        if self.fs.file_exists(output_path) && !self.fs.force_overwrite() {
            info!(path = output_path, "File exists, skipping");
            return Ok(GenerationStatus::skipped("already exists"));
        }

        let template = if context.use_claude_squad {
            info!("Using squad action plan template");
            PromptTemplate::ActionPlanSquad
        } else {
            PromptTemplate::ActionPlanSingle
        };

        info!(path = output_path, "Generating content");
        let content = match self.llm.generate_content(template, context).await? {
            Ok(content) => content,
            Err(e) => {
                error!(path = output_path, error = %e, "Generation failed");
                return Ok(GenerationStatus::failed(e));
            }
        };

        if self.fs.write_file(output_path, &content) {
            info!(path = output_path, "Generated successfully");
            Ok(GenerationStatus::success())
        } else {
            Ok(GenerationStatus::failed(format!(
                "could not write {output_path}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockBackend;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fixture(response: &str) -> (TempDir, ProjectFs, LlmInterface) {
        let dir = TempDir::new().unwrap();
        let fs = ProjectFs::new(dir.path().to_path_buf(), false, false);
        let llm = LlmInterface::new(Arc::new(MockBackend::with_response(response)), None);
        (dir, fs, llm)
    }

    #[tokio::test]
    async fn test_generate_claude_md_writes_file() {
        let (dir, fs, llm) = fixture("# Project Guide");
        let generator = DocGenerator::new(&llm, &fs);

        let status = generator
            .generate_claude_md(&ProjectContext::default())
            .await
            .unwrap();

        assert_eq!(status, GenerationStatus::success());
        let written = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
        assert_eq!(written, "# Project Guide");
    }

    #[tokio::test]
    async fn test_existing_file_skipped_without_llm_call() {
        let (dir, fs, _) = fixture("");
        std::fs::write(dir.path().join("CLAUDE.md"), "keep me").unwrap();

        let backend = Arc::new(MockBackend::with_response("new content"));
        let llm = LlmInterface::new(backend.clone(), None);
        let generator = DocGenerator::new(&llm, &fs);

        let status = generator
            .generate_claude_md(&ProjectContext::default())
            .await
            .unwrap();

        assert!(matches!(status, GenerationStatus::Skipped(_)));
        assert_eq!(backend.call_count(), 0);
        let kept = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
        assert_eq!(kept, "keep me");
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_status_no_write() {
        let dir = TempDir::new().unwrap();
        let fs = ProjectFs::new(dir.path().to_path_buf(), false, false);
        let llm = LlmInterface::new(Arc::new(MockBackend::failing("down")), None);
        let generator = DocGenerator::new(&llm, &fs);

        let status = generator
            .generate_claude_md(&ProjectContext::default())
            .await
            .unwrap();

        assert!(status.is_failure());
        assert!(!dir.path().join("CLAUDE.md").exists());
    }

    #[tokio::test]
    async fn test_action_plan_squad_template_selection() {
        let (dir, fs, _) = fixture("");
        let backend = Arc::new(MockBackend::with_response("plan"));
        let llm = LlmInterface::new(backend.clone(), None);
        let generator = DocGenerator::new(&llm, &fs);

        let context = ProjectContext {
            use_claude_squad: true,
            ..ProjectContext::default()
        };
        generator
            .generate_action_plan(&context, None)
            .await
            .unwrap();

        let requests = backend.requests();
        assert!(requests[0].prompt.contains("Claude Squad"));
        assert!(dir.path().join("ACTION_PLAN.md").exists());
    }

    #[tokio::test]
    async fn test_action_plan_output_override() {
        let (dir, fs, llm) = fixture("plan");
        let generator = DocGenerator::new(&llm, &fs);

        let status = generator
            .generate_action_plan(&ProjectContext::default(), Some("docs/PLAN.md"))
            .await
            .unwrap();

        assert_eq!(status, GenerationStatus::success());
        assert!(dir.path().join("docs/PLAN.md").exists());
        assert!(!dir.path().join("ACTION_PLAN.md").exists());
    }
}
