//! Verbose-mode prompt recording
//!
//! Writes every rendered prompt into a timestamped session directory under
//! the project so a user can audit exactly what was sent. Recording happens
//! in dry runs too.

use crate::config::PROMPT_RECORD_DIR;
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Records rendered prompts into `<project>/.cc-bootstrap-prompts/<timestamp>/`.
pub struct PromptRecorder {
    session_dir: PathBuf,
    counter: u32,
}

impl PromptRecorder {
    /// Creates the session directory for this run.
    pub fn create(project_path: &Path) -> io::Result<Self> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let session_dir = project_path.join(PROMPT_RECORD_DIR).join(timestamp);
        fs::create_dir_all(&session_dir)?;
        debug!(dir = %session_dir.display(), "Created prompt recording directory");

        Ok(Self {
            session_dir,
            counter: 0,
        })
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Writes one prompt as `NNN_<template>.md`. The counter orders prompts
    /// within the session.
    pub fn record(
        &mut self,
        template_id: &str,
        prompt: &str,
        system_prompt: &str,
        backend_label: &str,
    ) -> io::Result<PathBuf> {
        self.counter += 1;
        let filename = format!("{:03}_{template_id}.md", self.counter);
        let filepath = self.session_dir.join(&filename);

        let content = format!(
            "# LLM Prompt: {template_id}\n\n\
             Generated at: {}\n\
             Backend: {backend_label}\n\n\
             ## System Prompt\n\n{system_prompt}\n\n\
             ## User Prompt\n\n{prompt}\n",
            Local::now().to_rfc3339()
        );
        fs::write(&filepath, content)?;

        debug!(path = %filepath.display(), "Recorded prompt");
        self.write_metadata(backend_label)?;
        Ok(filepath)
    }

    /// Rewrites `metadata.json` with the running session summary.
    fn write_metadata(&self, backend_label: &str) -> io::Result<()> {
        let session = self
            .session_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let metadata = serde_json::json!({
            "session_start": session,
            "backend": backend_label,
            "total_prompts": self.counter,
        });
        let content = serde_json::to_string_pretty(&metadata)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.session_dir.join("metadata.json"), content)
    }
}
