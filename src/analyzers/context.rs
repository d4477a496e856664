//! Raw project context assembly
//!
//! [`ProjectContext`] is the typed accumulator threaded through the workflow.
//! The builder fills the scan-derived fields; optional stages (registry fetch,
//! research) add theirs through the orchestrator, which is the only mutator.

use crate::analyzers::directory::DirectoryScanner;
use crate::analyzers::sampler::FileSampler;
use crate::registry::ServerDescriptor;
use crate::research::ResearchResults;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything downstream generators may read. Generators receive this
/// read-only; only the workflow orchestrator mutates it between stages.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    /// Content of the user's plan file, `None` when absent or unreadable.
    pub user_plan_content: Option<String>,
    /// Sampled file contents keyed by project-relative path.
    pub project_file_samples: BTreeMap<String, String>,
    /// Whether the multi-agent (squad) action plan variant is requested.
    pub use_claude_squad: bool,
    /// Registry fetch stage: descriptor per requested server query, `None`
    /// when the query could not be resolved.
    pub mcp_servers: BTreeMap<String, Option<ServerDescriptor>>,
    /// Research stage output, when the stage ran.
    pub research: Option<ResearchResults>,
    /// Flattened research text block for prompt injection.
    pub formatted_research_insights: Option<String>,
}

/// Builds the raw context from project analysis.
pub struct ContextBuilder {
    project_path: PathBuf,
    plan_file: Option<PathBuf>,
}

impl ContextBuilder {
    pub fn new(project_path: PathBuf, plan_file: Option<PathBuf>) -> Self {
        Self {
            project_path,
            plan_file,
        }
    }

    /// Scans the project, samples files and reads the plan file.
    ///
    /// A scan failure passes through as an empty structure, which yields an
    /// empty sample set; a plan-file read failure warns and leaves the plan
    /// content unset. Neither is fatal.
    pub fn build_context(&self) -> ProjectContext {
        let analysis = DirectoryScanner::new(self.project_path.clone()).analyze();
        if let Some(reason) = &analysis.scan_error {
            warn!(reason = %reason, "Directory scan failed, proceeding with empty structure");
        }

        let sampler = FileSampler::new(&self.project_path, &analysis.structure);
        let project_file_samples = sampler.sample_default();

        let user_plan_content = self.plan_file.as_ref().and_then(|plan| {
            match std::fs::read_to_string(plan) {
                Ok(content) => Some(content),
                Err(e) => {
                    warn!(plan = %plan.display(), error = %e, "Could not read plan file");
                    None
                }
            }
        });

        info!(
            samples = project_file_samples.len(),
            has_plan = user_plan_content.is_some(),
            "Project context built"
        );

        ProjectContext {
            user_plan_content,
            project_file_samples,
            ..ProjectContext::default()
        }
    }
}
