//! Prompt templates
//!
//! Templates live in code as `format!` assemblies over the shared
//! [`ProjectContext`]. Rendering failure is a programming defect and
//! propagates as a hard error, unlike backend failures which stay inside
//! [`super::interface::GenerationResult`].

use crate::analyzers::ProjectContext;
use crate::config::COMMAND_CATALOG;
use anyhow::Result;
use serde_json::json;

/// System prompt shared by every generation call.
pub const SYSTEM_PROMPT: &str = "You are an expert software developer tasked with creating configuration files for Anthropic's Claude Code. Claude Code is an AI coding assistant that runs in the terminal. Generate professional, well-structured, and comprehensive content for the requested configuration file.";

/// The closed set of prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    ClaudeMd,
    ActionPlanSingle,
    ActionPlanSquad,
    AllCommands,
    ResearchQuestions,
}

impl PromptTemplate {
    /// Stable identifier, used for dry-run placeholders and prompt recording.
    pub fn id(&self) -> &'static str {
        match self {
            PromptTemplate::ClaudeMd => "claude_md",
            PromptTemplate::ActionPlanSingle => "action_plan_single",
            PromptTemplate::ActionPlanSquad => "action_plan_squad",
            PromptTemplate::AllCommands => "all_custom_commands",
            PromptTemplate::ResearchQuestions => "generate_research_questions",
        }
    }

    /// Renders the template against the context.
    pub fn render(&self, context: &ProjectContext) -> Result<String> {
        match self {
            PromptTemplate::ClaudeMd => render_claude_md(context),
            PromptTemplate::ActionPlanSingle => render_action_plan(context, false),
            PromptTemplate::ActionPlanSquad => render_action_plan(context, true),
            PromptTemplate::AllCommands => render_all_commands(context),
            PromptTemplate::ResearchQuestions => render_research_questions(context),
        }
    }
}

fn render_claude_md(context: &ProjectContext) -> Result<String> {
    let mut prompt = String::from(
        "Create a CLAUDE.md file for this project. CLAUDE.md is the project \
         guidance file Claude Code reads at the start of every session. It should \
         cover: project overview, architecture, key commands (build, test, lint), \
         code conventions, and anything an AI assistant must know before editing \
         this codebase.\n\n",
    );

    prompt.push_str(&project_sections(context));
    prompt.push_str(&mcp_server_section(context));

    prompt.push_str(
        "\nRespond with the complete CLAUDE.md content in Markdown. Do not wrap \
         the document in a code fence and do not add commentary before or after it.\n",
    );
    Ok(prompt)
}

fn render_action_plan(context: &ProjectContext, squad: bool) -> Result<String> {
    let mut prompt = String::from(
        "Create an ACTION_PLAN.md for this project: a concrete, ordered plan of \
         implementation tasks derived from the user's plan and the current state \
         of the codebase.\n\n",
    );

    if squad {
        prompt.push_str(
            "The plan will be executed by multiple Claude Code agents working in \
             parallel sessions (Claude Squad). Structure the plan as independent \
             workstreams with explicit task ownership, minimal cross-stream \
             dependencies, and a coordination section describing hand-off points.\n\n",
        );
    } else {
        prompt.push_str(
            "The plan will be executed by a single Claude Code session. Order the \
             tasks so each builds on the previous ones, with clear completion \
             criteria per task.\n\n",
        );
    }

    prompt.push_str(&project_sections(context));

    prompt.push_str(
        "\nRespond with the complete ACTION_PLAN.md content in Markdown. Do not \
         wrap the document in a code fence.\n",
    );
    Ok(prompt)
}

fn render_all_commands(context: &ProjectContext) -> Result<String> {
    let catalog = json!(COMMAND_CATALOG
        .iter()
        .map(|cat| {
            json!({
                "category": cat.name,
                "description": cat.description,
                "commands": cat.commands.iter().map(|c| json!({
                    "name": c.name,
                    "description": c.description,
                })).collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>());
    let catalog_text = serde_json::to_string_pretty(&catalog)?;

    let mut prompt = String::from(
        "Create the full set of Claude Code custom slash commands for this \
         project. Each command is a Markdown file describing what Claude Code \
         should do when the user invokes it; use $ARGUMENTS where the user's \
         input should be substituted.\n\nGenerate content for exactly these \
         commands:\n\n",
    );
    prompt.push_str(&catalog_text);
    prompt.push('\n');

    prompt.push_str(&project_sections(context));

    prompt.push_str(
        "\nRespond with a single JSON object mapping category name to an object \
         mapping command name to the full Markdown content of that command file. \
         Example shape: {\"code-review\": {\"review-file\": \"...\"}}. Respond \
         with JSON only, no surrounding text.\n",
    );
    Ok(prompt)
}

fn render_research_questions(context: &ProjectContext) -> Result<String> {
    let mut prompt = String::from(
        "Based on the project below, produce the most valuable research \
         questions whose answers would materially improve an implementation \
         plan. Focus on library choices, API usage, and best practices the \
         codebase appears to depend on. Produce at most 5 questions.\n\n",
    );

    prompt.push_str(&project_sections(context));

    prompt.push_str(
        "\nRespond with a JSON array of question strings, nothing else. \
         Example: [\"How does X handle Y?\"]\n",
    );
    Ok(prompt)
}

/// Shared prompt body: user plan, research insights and sampled files.
fn project_sections(context: &ProjectContext) -> String {
    let mut out = String::new();

    if let Some(plan) = &context.user_plan_content {
        out.push_str("## User Plan\n\n");
        out.push_str(plan);
        out.push_str("\n\n");
    }

    if let Some(insights) = &context.formatted_research_insights {
        out.push_str("## Research Insights\n\n");
        out.push_str(insights);
        out.push_str("\n\n");
    }

    if !context.project_file_samples.is_empty() {
        out.push_str("## Project Files\n\n");
        for (path, content) in &context.project_file_samples {
            out.push_str(&format!("### {path}\n\n```\n{content}\n```\n\n"));
        }
    }

    out
}

/// Summary of the configured MCP servers, for documentation prompts.
fn mcp_server_section(context: &ProjectContext) -> String {
    if context.mcp_servers.is_empty() {
        return String::new();
    }

    let mut out = String::from("## Configured MCP Servers\n\n");
    for (query, descriptor) in &context.mcp_servers {
        match descriptor {
            Some(d) => {
                out.push_str(&format!("- `{}`: {}\n", d.qualified_name, d.display_name));
                if let Some(summary) = &d.config_summary {
                    out.push_str(&format!("  Configuration: {summary}\n"));
                }
            }
            None => out.push_str(&format!("- `{query}`: (unresolved)\n")),
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServerDescriptor;

    #[test]
    fn test_template_ids_are_distinct() {
        let ids = [
            PromptTemplate::ClaudeMd.id(),
            PromptTemplate::ActionPlanSingle.id(),
            PromptTemplate::ActionPlanSquad.id(),
            PromptTemplate::AllCommands.id(),
            PromptTemplate::ResearchQuestions.id(),
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_claude_md_includes_samples_and_plan() {
        let mut context = ProjectContext::default();
        context.user_plan_content = Some("build the widget".to_string());
        context
            .project_file_samples
            .insert("src/main.rs".to_string(), "fn main() {}".to_string());

        let prompt = PromptTemplate::ClaudeMd.render(&context).unwrap();
        assert!(prompt.contains("build the widget"));
        assert!(prompt.contains("### src/main.rs"));
        assert!(prompt.contains("fn main() {}"));
    }

    #[test]
    fn test_action_plan_variants_differ() {
        let context = ProjectContext::default();
        let single = PromptTemplate::ActionPlanSingle.render(&context).unwrap();
        let squad = PromptTemplate::ActionPlanSquad.render(&context).unwrap();

        assert!(single.contains("single Claude Code session"));
        assert!(squad.contains("Claude Squad"));
        assert_ne!(single, squad);
    }

    #[test]
    fn test_all_commands_lists_catalog() {
        let context = ProjectContext::default();
        let prompt = PromptTemplate::AllCommands.render(&context).unwrap();

        for cat in COMMAND_CATALOG {
            assert!(prompt.contains(cat.name));
            for cmd in cat.commands {
                assert!(prompt.contains(cmd.name));
            }
        }
        assert!(prompt.contains("JSON object"));
    }

    #[test]
    fn test_mcp_section_mentions_unresolved_servers() {
        let mut context = ProjectContext::default();
        context.mcp_servers.insert("ghost".to_string(), None);
        context.mcp_servers.insert(
            "fetch".to_string(),
            Some(ServerDescriptor {
                qualified_name: "smithery/fetch".to_string(),
                display_name: "Fetch".to_string(),
                ..ServerDescriptor::default()
            }),
        );

        let prompt = PromptTemplate::ClaudeMd.render(&context).unwrap();
        assert!(prompt.contains("`smithery/fetch`: Fetch"));
        assert!(prompt.contains("`ghost`: (unresolved)"));
    }
}
