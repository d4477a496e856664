//! Custom command generation
//!
//! One LLM call produces every command file as a JSON object keyed by
//! category and command name. Unknown categories or commands in the response
//! are ignored with a warning; catalog entries missing from the response are
//! warned about but do not fail the asset. Each file has its own
//! existence/overwrite check, so a rerun fills in only what is missing.

use crate::analyzers::ProjectContext;
use crate::config::{catalog_category, COMMAND_CATALOG, COMMANDS_DIR_PATH};
use crate::fs::ProjectFs;
use crate::generators::GenerationStatus;
use crate::llm::{extract_json_block, LlmInterface, PromptTemplate};
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

pub struct CommandGenerator<'a> {
    llm: &'a LlmInterface,
    fs: &'a ProjectFs,
}

impl<'a> CommandGenerator<'a> {
    pub fn new(llm: &'a LlmInterface, fs: &'a ProjectFs) -> Self {
        Self { llm, fs }
    }

    pub async fn generate_commands(&self, context: &ProjectContext) -> Result<GenerationStatus> {
        if !self.fs.ensure_directory(COMMANDS_DIR_PATH) {
            return Ok(GenerationStatus::failed(format!(
                "could not create {COMMANDS_DIR_PATH}"
            )));
        }

        info!("Generating all custom commands via a single LLM call");
        let raw = match self
            .llm
            .generate_content(PromptTemplate::AllCommands, context)
            .await?
        {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "LLM failed to generate commands");
                return Ok(GenerationStatus::failed(e));
            }
        };

        let parsed: BTreeMap<String, BTreeMap<String, Value>> =
            match serde_json::from_str(extract_json_block(&raw)) {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!(error = %e, "Failed to parse commands JSON response");
                    return Ok(GenerationStatus::failed(format!(
                        "could not parse commands response: {e}"
                    )));
                }
            };
        debug!(categories = parsed.len(), "Parsed commands response");

        let mut generated = 0usize;
        let mut skipped = 0usize;
        let mut errors = 0usize;

        for (category_name, commands) in &parsed {
            let category = match catalog_category(category_name) {
                Some(category) => category,
                None => {
                    warn!(category = %category_name, "Unknown category in response, skipping");
                    continue;
                }
            };

            let category_dir = format!("{COMMANDS_DIR_PATH}/{category_name}");
            if !self.fs.ensure_directory(&category_dir) {
                errors += 1;
                continue;
            }

            for (command_name, content) in commands {
                if !category.commands.iter().any(|c| c.name == command_name) {
                    warn!(
                        category = %category_name,
                        command = %command_name,
                        "Unknown command in response, skipping"
                    );
                    continue;
                }

                let content = match content.as_str() {
                    Some(content) => content,
                    None => {
                        warn!(command = %command_name, "Command content is not a string, skipping");
                        errors += 1;
                        continue;
                    }
                };

                let file_path = format!("{category_dir}/{command_name}.md");
                if self.fs.file_exists(&file_path) && !self.fs.force_overwrite() {
                    info!(path = %file_path, "File exists, skipping");
                    skipped += 1;
                    continue;
                }

                if self.fs.write_file(&file_path, content) {
                    generated += 1;
                } else {
                    error!(path = %file_path, "Failed to write command file");
                    errors += 1;
                }
            }
        }

        for category in COMMAND_CATALOG {
            match parsed.get(category.name) {
                None => warn!(category = category.name, "Category missing from response"),
                Some(commands) => {
                    for spec in category.commands {
                        if !commands.contains_key(spec.name) {
                            warn!(
                                category = category.name,
                                command = spec.name,
                                "Command missing from response"
                            );
                        }
                    }
                }
            }
        }

        Ok(if errors > 0 {
            GenerationStatus::Partial {
                generated,
                skipped,
                errors,
            }
        } else if generated == 0 && skipped > 0 {
            GenerationStatus::skipped("all files already exist")
        } else if generated > 0 {
            GenerationStatus::Success(Some(format!("{generated} generated, {skipped} skipped")))
        } else {
            GenerationStatus::failed("no commands generated")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockBackend;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn commands_response() -> String {
        json!({
            "code-review": {
                "review-file": "Review $ARGUMENTS thoroughly.",
                "review-pr": "Review the pull request."
            },
            "git-workflow": {
                "prepare-commit": "Prepare a commit message."
            }
        })
        .to_string()
    }

    fn fixture(response: &str) -> (TempDir, ProjectFs, LlmInterface) {
        let dir = TempDir::new().unwrap();
        let fs = ProjectFs::new(dir.path().to_path_buf(), false, false);
        let llm = LlmInterface::new(Arc::new(MockBackend::with_response(response)), None);
        (dir, fs, llm)
    }

    #[tokio::test]
    async fn test_writes_command_files_per_category() {
        let (dir, fs, llm) = fixture(&commands_response());
        let generator = CommandGenerator::new(&llm, &fs);

        let status = generator
            .generate_commands(&ProjectContext::default())
            .await
            .unwrap();

        assert_eq!(
            status,
            GenerationStatus::Success(Some("3 generated, 0 skipped".to_string()))
        );
        let review = dir
            .path()
            .join(".claude/commands/code-review/review-file.md");
        assert_eq!(
            std::fs::read_to_string(review).unwrap(),
            "Review $ARGUMENTS thoroughly."
        );
        assert!(dir
            .path()
            .join(".claude/commands/git-workflow/prepare-commit.md")
            .exists());
    }

    #[tokio::test]
    async fn test_unknown_categories_and_commands_ignored() {
        let response = json!({
            "made-up-category": {"anything": "content"},
            "code-review": {
                "review-file": "ok",
                "made-up-command": "content"
            }
        })
        .to_string();
        let (dir, fs, llm) = fixture(&response);
        let generator = CommandGenerator::new(&llm, &fs);

        let status = generator
            .generate_commands(&ProjectContext::default())
            .await
            .unwrap();

        assert_eq!(
            status,
            GenerationStatus::Success(Some("1 generated, 0 skipped".to_string()))
        );
        assert!(!dir.path().join(".claude/commands/made-up-category").exists());
        assert!(!dir
            .path()
            .join(".claude/commands/code-review/made-up-command.md")
            .exists());
    }

    #[tokio::test]
    async fn test_existing_files_skipped_individually() {
        let (dir, fs, llm) = fixture(&commands_response());
        let existing = dir.path().join(".claude/commands/code-review");
        std::fs::create_dir_all(&existing).unwrap();
        std::fs::write(existing.join("review-file.md"), "original").unwrap();

        let generator = CommandGenerator::new(&llm, &fs);
        let status = generator
            .generate_commands(&ProjectContext::default())
            .await
            .unwrap();

        assert_eq!(
            status,
            GenerationStatus::Success(Some("2 generated, 1 skipped".to_string()))
        );
        assert_eq!(
            std::fs::read_to_string(existing.join("review-file.md")).unwrap(),
            "original"
        );
    }

    #[tokio::test]
    async fn test_non_json_response_fails() {
        let (_dir, fs, llm) = fixture("not json at all");
        let generator = CommandGenerator::new(&llm, &fs);

        let status = generator
            .generate_commands(&ProjectContext::default())
            .await
            .unwrap();

        assert!(status.is_failure());
    }

    #[tokio::test]
    async fn test_fenced_response_accepted() {
        let response = format!("```json\n{}\n```", commands_response());
        let (dir, fs, llm) = fixture(&response);
        let generator = CommandGenerator::new(&llm, &fs);

        let status = generator
            .generate_commands(&ProjectContext::default())
            .await
            .unwrap();

        assert!(matches!(status, GenerationStatus::Success(_)));
        assert!(dir
            .path()
            .join(".claude/commands/code-review/review-pr.md")
            .exists());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_status() {
        let dir = TempDir::new().unwrap();
        let fs = ProjectFs::new(dir.path().to_path_buf(), false, false);
        let llm = LlmInterface::new(Arc::new(MockBackend::failing("quota")), None);
        let generator = CommandGenerator::new(&llm, &fs);

        let status = generator
            .generate_commands(&ProjectContext::default())
            .await
            .unwrap();

        assert!(status.is_failure());
    }
}
