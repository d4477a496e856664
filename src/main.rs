use cc_bootstrap::cli::commands::CliArgs;
use cc_bootstrap::cli::output::{create_progress_bar, print_report, update_progress_bar};
use cc_bootstrap::fs::ProjectFs;
use cc_bootstrap::llm::{
    create_backend, resolve_model, BackendOptions, LlmInterface, PromptRecorder,
};
use cc_bootstrap::workflow::{Workflow, WorkflowConfig};
use cc_bootstrap::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, error, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("cc-bootstrap v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = run(args).await;
    std::process::exit(exit_code);
}

async fn run(args: CliArgs) -> i32 {
    if !args.project_path.is_dir() {
        error!(
            path = %args.project_path.display(),
            "Project path does not exist or is not a directory"
        );
        return 1;
    }

    let model = resolve_model(args.provider, &args.model);
    let thinking_budget = args.thinking.then_some(args.thinking_budget);

    let mut llm = if args.dry_run {
        LlmInterface::dry_run()
    } else {
        let options = BackendOptions {
            api_key: args.api_key.clone(),
            aws_region: args.aws_region.clone(),
        };
        match create_backend(args.provider, model, &options) {
            Ok(backend) => LlmInterface::new(backend, thinking_budget),
            Err(e) => {
                error!("{e}");
                return 1;
            }
        }
    };

    if args.verbose {
        match PromptRecorder::create(&args.project_path) {
            Ok(recorder) => {
                llm = llm.with_recorder(recorder);
            }
            Err(e) => warn!(error = %e, "Could not set up prompt recording"),
        }
    }

    if !args.mcp_servers.is_empty() && args.registry_api_key.is_none() {
        warn!("MCP servers requested but no registry API key, the fetch stage will be skipped");
    }
    if args.research && args.research_api_key.is_none() {
        warn!("Research requested but no research API key, the research stage will be skipped");
    }

    let fs = ProjectFs::new(args.project_path.clone(), args.force, args.dry_run);
    let config = WorkflowConfig {
        plan_file: args.plan_file.clone(),
        use_claude_squad: args.claude_squad,
        mcp_server_queries: args.mcp_servers.clone(),
        registry_api_key: args.registry_api_key.clone(),
        use_research: args.research,
        research_api_key: args.research_api_key.clone(),
        skip_commands: args.skip_commands,
        skip_mcp_config: args.skip_mcp_config,
        action_plan_output: args.action_plan_output.clone(),
    };

    let workflow = Workflow::new(args.project_path.clone(), llm, fs, config);
    let bar = create_progress_bar(workflow.steps().len());

    let results = workflow
        .execute(|description, status, _, _| {
            if let Some(bar) = &bar {
                update_progress_bar(bar, description, status);
            }
        })
        .await;

    if let Some(bar) = bar {
        bar.finish_with_message("All steps completed");
    }

    print_report(&results, args.dry_run);

    if results.any_failure() {
        1
    } else {
        0
    }
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else {
            let level_str =
                env::var("CC_BOOTSTRAP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive(format!("cc_bootstrap={}", level).parse().unwrap())
                .add_directive("hyper=warn".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap());
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}
