use crate::config::{
    DEFAULT_MODEL_PLACEHOLDER, DEFAULT_THINKING_BUDGET, ENV_ANTHROPIC_API_KEY, ENV_AWS_REGION,
    ENV_REGISTRY_API_KEY, ENV_RESEARCH_API_KEY,
};
use crate::llm::Provider;
use clap::Parser;
use std::path::PathBuf;

/// Bootstraps Claude Code configuration assets for a project
#[derive(Parser, Debug)]
#[command(
    name = "cc-bootstrap",
    about = "Generates Claude Code configuration assets for a project",
    version,
    long_about = "cc-bootstrap samples a project's file tree, optionally researches open \
                  questions, and drives an LLM to generate CLAUDE.md, custom commands, \
                  MCP server config, settings and an action plan."
)]
pub struct CliArgs {
    #[arg(
        value_name = "PATH",
        default_value = ".",
        help = "Path to the target project directory"
    )]
    pub project_path: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        help = "Path to the user's project plan/specification file"
    )]
    pub plan_file: Option<PathBuf>,

    #[arg(
        long,
        default_value = "anthropic",
        help = "LLM provider (anthropic or bedrock)"
    )]
    pub provider: Provider,

    #[arg(
        long,
        default_value = DEFAULT_MODEL_PLACEHOLDER,
        value_name = "MODEL",
        help = "LLM model id (uses the provider's default if not set)"
    )]
    pub model: String,

    #[arg(
        long,
        value_name = "KEY",
        help = format!("Anthropic API key (or use {ENV_ANTHROPIC_API_KEY})")
    )]
    pub api_key: Option<String>,

    #[arg(
        long,
        value_name = "REGION",
        help = format!("AWS region for Bedrock (or use {ENV_AWS_REGION})")
    )]
    pub aws_region: Option<String>,

    #[arg(
        long,
        value_name = "NAMES",
        value_delimiter = ',',
        help = "Comma-separated MCP server names or search queries"
    )]
    pub mcp_servers: Vec<String>,

    #[arg(
        long,
        value_name = "KEY",
        env = ENV_REGISTRY_API_KEY,
        help = "MCP registry API key"
    )]
    pub registry_api_key: Option<String>,

    #[arg(long, help = "Research open questions before generating assets")]
    pub research: bool,

    #[arg(
        long,
        value_name = "KEY",
        env = ENV_RESEARCH_API_KEY,
        help = "Research API key"
    )]
    pub research_api_key: Option<String>,

    #[arg(long, help = "Generate the multi-agent (Claude Squad) action plan")]
    pub claude_squad: bool,

    #[arg(long, help = "Enable extended LLM thinking")]
    pub thinking: bool,

    #[arg(
        long,
        value_name = "TOKENS",
        default_value_t = DEFAULT_THINKING_BUDGET,
        help = "Token budget for thinking"
    )]
    pub thinking_budget: u32,

    #[arg(long, help = "Skip custom commands generation")]
    pub skip_commands: bool,

    #[arg(long, help = "Skip MCP config generation")]
    pub skip_mcp_config: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Write the action plan to this path instead of ACTION_PLAN.md"
    )]
    pub action_plan_output: Option<String>,

    #[arg(short = 'f', long, help = "Overwrite existing files")]
    pub force: bool,

    #[arg(long, help = "Simulate the run without network calls or writes")]
    pub dry_run: bool,

    #[arg(
        short = 'v',
        long,
        help = "Verbose output; records rendered prompts to disk"
    )]
    pub verbose: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["cc-bootstrap"]);
        assert_eq!(args.project_path, PathBuf::from("."));
        assert_eq!(args.provider, Provider::Anthropic);
        assert_eq!(args.model, DEFAULT_MODEL_PLACEHOLDER);
        assert!(args.mcp_servers.is_empty());
        assert!(!args.force);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_mcp_servers_comma_separated() {
        let args = CliArgs::parse_from([
            "cc-bootstrap",
            "--mcp-servers",
            "owner/repo,exa,web search",
        ]);
        assert_eq!(args.mcp_servers, vec!["owner/repo", "exa", "web search"]);
    }

    #[test]
    fn test_provider_parsing() {
        let args = CliArgs::parse_from(["cc-bootstrap", "--provider", "bedrock"]);
        assert_eq!(args.provider, Provider::Bedrock);

        assert!(CliArgs::try_parse_from(["cc-bootstrap", "--provider", "openai"]).is_err());
    }

    #[test]
    fn test_thinking_budget_default() {
        let args = CliArgs::parse_from(["cc-bootstrap", "--thinking"]);
        assert!(args.thinking);
        assert_eq!(args.thinking_budget, DEFAULT_THINKING_BUDGET);
    }
}
