//! Workflow orchestration
//!
//! The [`Workflow`] is the sole caller of every other component and the only
//! holder of explicit state (step index, accumulated results). Steps run
//! strictly sequentially; a step failure is converted into a per-asset
//! status and never aborts later steps. The one real data dependency is
//! settings generation reading the MCP config output, which it does
//! defensively.

use crate::analyzers::{ContextBuilder, ProjectContext};
use crate::fs::ProjectFs;
use crate::generators::{CommandGenerator, ConfigGenerator, DocGenerator, GenerationStatus};
use crate::llm::LlmInterface;
use crate::registry::RegistryClient;
use crate::research::{QuestionGenerator, ResearchClient};
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Everything the orchestrator needs to decide the step list.
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    pub plan_file: Option<PathBuf>,
    pub use_claude_squad: bool,
    /// Registry queries from the user; empty disables the fetch stage.
    pub mcp_server_queries: Vec<String>,
    pub registry_api_key: Option<String>,
    pub use_research: bool,
    pub research_api_key: Option<String>,
    pub skip_commands: bool,
    pub skip_mcp_config: bool,
    pub action_plan_output: Option<String>,
}

/// Observable state of one step, reported through the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Starting => write!(f, "Starting"),
            StepStatus::InProgress => write!(f, "In progress"),
            StepStatus::Completed => write!(f, "Completed"),
            StepStatus::Failed => write!(f, "Failed"),
            StepStatus::Skipped => write!(f, "Skipped"),
        }
    }
}

/// One status slot per generated asset.
#[derive(Debug, Clone)]
pub struct WorkflowResults {
    pub claude_md: GenerationStatus,
    pub commands: GenerationStatus,
    pub mcp_config: GenerationStatus,
    pub settings: GenerationStatus,
    pub action_plan: GenerationStatus,
}

impl WorkflowResults {
    /// Rows for the final report, in generation order.
    pub fn rows(&self) -> Vec<(&'static str, &GenerationStatus)> {
        vec![
            ("CLAUDE.md", &self.claude_md),
            ("Custom commands", &self.commands),
            ("MCP config", &self.mcp_config),
            ("settings.json", &self.settings),
            ("Action plan", &self.action_plan),
        ]
    }

    pub fn any_failure(&self) -> bool {
        self.rows().iter().any(|(_, status)| status.is_failure())
    }
}

pub struct Workflow {
    project_path: PathBuf,
    llm: LlmInterface,
    fs: ProjectFs,
    config: WorkflowConfig,
}

impl Workflow {
    pub fn new(
        project_path: PathBuf,
        llm: LlmInterface,
        fs: ProjectFs,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            project_path,
            llm,
            fs,
            config,
        }
    }

    fn registry_enabled(&self) -> bool {
        !self.config.mcp_server_queries.is_empty() && self.config.registry_api_key.is_some()
    }

    fn research_enabled(&self) -> bool {
        self.config.use_research && self.config.research_api_key.is_some()
    }

    /// The ordered step descriptions for this configuration.
    pub fn steps(&self) -> Vec<String> {
        let mut steps = vec!["Building project context".to_string()];

        if self.registry_enabled() {
            steps.push("Fetching MCP server details from registry".to_string());
        }
        if self.research_enabled() {
            steps.push("Performing research".to_string());
        }

        steps.push("Generating CLAUDE.md".to_string());
        steps.push(if self.config.skip_commands {
            "Skipping custom commands".to_string()
        } else {
            "Generating custom commands".to_string()
        });
        steps.push(if self.config.skip_mcp_config {
            "Skipping MCP config".to_string()
        } else {
            "Generating MCP config".to_string()
        });
        steps.push("Generating settings.json".to_string());
        steps.push(if self.config.use_claude_squad {
            "Generating Squad Action Plan".to_string()
        } else {
            "Generating Action Plan".to_string()
        });

        steps
    }

    /// Runs the whole workflow. `progress` receives
    /// `(description, status, current_step, total_steps)` for every
    /// transition; every step emits a terminal status before the next one
    /// starts.
    pub async fn execute<F>(&self, mut progress: F) -> WorkflowResults
    where
        F: FnMut(&str, StepStatus, usize, usize),
    {
        info!("Executing workflow");

        let steps = self.steps();
        let total = steps.len();
        let mut current = 0usize;

        let mut emit = |description: &str, status: StepStatus, index: usize| {
            progress(description, status, index + 1, total);
        };

        // Context build
        emit(&steps[current], StepStatus::Starting, current);
        let mut context = ContextBuilder::new(
            self.project_path.clone(),
            self.config.plan_file.clone(),
        )
        .build_context();
        context.use_claude_squad = self.config.use_claude_squad;
        emit(&steps[current], StepStatus::Completed, current);
        current += 1;

        // Optional registry fetch
        if self.registry_enabled() {
            emit(&steps[current], StepStatus::Starting, current);
            let api_key = self
                .config
                .registry_api_key
                .clone()
                .unwrap_or_default();
            let client = RegistryClient::new(api_key);
            context.mcp_servers = client.fetch_all(&self.config.mcp_server_queries).await;

            let resolved = context.mcp_servers.values().filter(|d| d.is_some()).count();
            info!(
                resolved,
                requested = self.config.mcp_server_queries.len(),
                "Registry fetch completed"
            );
            emit(&steps[current], StepStatus::Completed, current);
            current += 1;
        } else if !self.config.mcp_server_queries.is_empty() {
            warn!("MCP server queries provided but no registry API key, skipping fetch");
        }

        // Optional research
        if self.research_enabled() {
            emit(&steps[current], StepStatus::Starting, current);
            self.perform_research(&mut context).await;
            emit(&steps[current], StepStatus::Completed, current);
            current += 1;
        }

        let doc_generator = DocGenerator::new(&self.llm, &self.fs);
        let command_generator = CommandGenerator::new(&self.llm, &self.fs);
        let config_generator = ConfigGenerator::new(&self.fs);

        // CLAUDE.md
        emit(&steps[current], StepStatus::InProgress, current);
        let claude_md = fold_outcome(doc_generator.generate_claude_md(&context).await);
        emit(&steps[current], terminal_status(&claude_md), current);
        current += 1;

        // Custom commands
        let commands = if self.config.skip_commands {
            emit(&steps[current], StepStatus::Skipped, current);
            GenerationStatus::Skipped(None)
        } else {
            emit(&steps[current], StepStatus::InProgress, current);
            let status = fold_outcome(command_generator.generate_commands(&context).await);
            emit(&steps[current], terminal_status(&status), current);
            status
        };
        current += 1;

        // MCP config
        let mcp_config = if self.config.skip_mcp_config {
            emit(&steps[current], StepStatus::Skipped, current);
            GenerationStatus::Skipped(None)
        } else {
            emit(&steps[current], StepStatus::InProgress, current);
            let status = fold_outcome(config_generator.generate_mcp_config(&context));
            emit(&steps[current], terminal_status(&status), current);
            status
        };
        current += 1;

        // Settings (reads the MCP config output defensively)
        emit(&steps[current], StepStatus::InProgress, current);
        let settings = fold_outcome(config_generator.generate_settings());
        emit(&steps[current], terminal_status(&settings), current);
        current += 1;

        // Action plan
        emit(&steps[current], StepStatus::InProgress, current);
        let action_plan = fold_outcome(
            doc_generator
                .generate_action_plan(&context, self.config.action_plan_output.as_deref())
                .await,
        );
        emit(&steps[current], terminal_status(&action_plan), current);

        info!("Workflow execution completed");
        WorkflowResults {
            claude_md,
            commands,
            mcp_config,
            settings,
            action_plan,
        }
    }

    /// Research stage: LLM-generated questions answered through the research
    /// API. Failures shrink the result set; an empty set leaves the context
    /// untouched.
    async fn perform_research(&self, context: &mut ProjectContext) {
        let questions = QuestionGenerator::new(&self.llm)
            .generate_questions(context)
            .await;
        if questions.is_empty() {
            info!("No research questions generated");
            return;
        }

        let api_key = self
            .config
            .research_api_key
            .clone()
            .unwrap_or_default();
        let client = ResearchClient::new(api_key);
        let results = client.research_all(&questions).await;

        if !results.is_empty() {
            context.formatted_research_insights = Some(results.format_insights());
            context.research = Some(results);
        }
    }
}

/// Converts a generator outcome into a status, folding hard errors (template
/// rendering defects) into per-asset failures at the orchestrator boundary.
fn fold_outcome(outcome: anyhow::Result<GenerationStatus>) -> GenerationStatus {
    match outcome {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "Step failed with internal error");
            GenerationStatus::failed(e)
        }
    }
}

fn terminal_status(status: &GenerationStatus) -> StepStatus {
    match status {
        GenerationStatus::Failed(_) => StepStatus::Failed,
        GenerationStatus::Skipped(_) => StepStatus::Skipped,
        _ => StepStatus::Completed,
    }
}
