//! Static configuration for cc-bootstrap
//!
//! Sampling limits, scoring sets, artifact paths and provider defaults live
//! here so every component shares one source of truth. Credentials are read
//! from the environment variables named below; see `llm::factory` for how they
//! are resolved.

/// Environment variable holding the Anthropic API key.
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Environment variable holding the research API key.
pub const ENV_RESEARCH_API_KEY: &str = "PERPLEXITY_API_KEY";
/// Environment variable holding the MCP registry API key.
pub const ENV_REGISTRY_API_KEY: &str = "SMITHERY_API_KEY";
/// Environment variable selecting the Bedrock region.
pub const ENV_AWS_REGION: &str = "AWS_REGION";
/// Environment variable holding the Bedrock bearer token.
pub const ENV_BEDROCK_BEARER_TOKEN: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Sentinel model name meaning "use the provider's default".
pub const DEFAULT_MODEL_PLACEHOLDER: &str = "provider-default";

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_BEDROCK_MODEL: &str = "us.anthropic.claude-3-7-sonnet-20250219-v1:0";
pub const DEFAULT_BEDROCK_REGION: &str = "us-west-2";

/// Token ceiling when extended thinking is enabled.
pub const MAX_TOKENS_THINKING_ENABLED: u32 = 100_000;
/// Token ceiling for plain generation.
pub const MAX_TOKENS_THINKING_DISABLED: u32 = 8_000;
/// Default thinking budget when `--thinking` is passed without a budget.
pub const DEFAULT_THINKING_BUDGET: u32 = 6_000;
/// Generation temperature. Forced to 1.0 by the backends while thinking is on.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Client-side timeout configured once per HTTP client. This is a resource
/// ceiling, not a retry policy; thinking-mode responses can take minutes.
pub const REQUEST_TIMEOUT_SECS: u64 = 3_600;

pub const REGISTRY_API_BASE_URL: &str = "https://registry.smithery.ai";
pub const RESEARCH_API_BASE_URL: &str = "https://api.perplexity.ai";
pub const RESEARCH_MODEL: &str = "sonar-pro";

/// Root-relative output paths for the generated assets.
pub const CLAUDE_MD_PATH: &str = "CLAUDE.md";
pub const CLAUDE_DIR_PATH: &str = ".claude";
pub const COMMANDS_DIR_PATH: &str = ".claude/commands";
pub const SETTINGS_JSON_PATH: &str = ".claude/settings.json";
pub const MCP_JSON_PATH: &str = ".mcp.json";
pub const ACTION_PLAN_PATH: &str = "ACTION_PLAN.md";

/// Directory (root-relative) where verbose mode records rendered prompts.
pub const PROMPT_RECORD_DIR: &str = ".cc-bootstrap-prompts";

/// Startup timeout written into every generated MCP server entry.
pub const MCP_STARTUP_TIMEOUT_MILLIS: u64 = 10_000;

/// Sampling limits. The sampler output is bounded by
/// `MAX_FILES_IN_CONTEXT * MAX_CHARS_PER_FILE` regardless of project size.
pub const MAX_FILES_IN_CONTEXT: usize = 20;
pub const MAX_LINES_PER_FILE: usize = 500;
pub const MAX_CHARS_PER_FILE: usize = 5_000;

/// Files below this size earn the small-file scoring bonus.
pub const SMALL_FILE_KB: u64 = 10;

/// Directory names pruned before descent, at every depth.
pub const IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "venv",
    ".venv",
    "env",
    "__pycache__",
    "dist",
    "build",
    ".cache",
    ".next",
    ".nuxt",
    ".output",
    "target",
    "out",
    "coverage",
    ".nyc_output",
    ".DS_Store",
    ".idea",
    ".vscode",
    ".gradle",
    ".dart_tool",
    ".pub",
    ".angular",
    ".svelte-kit",
    ".parcel-cache",
    "vendor",
    "bower_components",
    ".bundle",
    "tmp",
    "temp",
    "logs",
    ".yarn",
    ".pnp",
];

pub fn is_ignored_dir(name: &str) -> bool {
    IGNORE_DIRS.contains(&name)
}

/// Manifests, lockfiles, CI and IaC configs that anchor a project.
pub const IMPORTANT_FILES: &[&str] = &[
    "README.md",
    "package.json",
    "requirements.txt",
    "setup.py",
    "pyproject.toml",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".gitignore",
    ".env.example",
    "tsconfig.json",
    "webpack.config.js",
    "vite.config.js",
    "rollup.config.js",
    "next.config.js",
    "nuxt.config.js",
    "angular.json",
    "svelte.config.js",
    "tauri.conf.json",
    "capacitor.config.json",
    "pubspec.yaml",
    "go.mod",
    "Cargo.toml",
    "pom.xml",
    "build.gradle",
    "settings.gradle",
    ".gitlab-ci.yml",
    "Jenkinsfile",
    "bitbucket-pipelines.yml",
    "azure-pipelines.yml",
    "travis.yml",
    "sonar-project.properties",
    "manifest.json",
    "composer.json",
    "Gemfile",
    "tox.ini",
    "pytest.ini",
    "phpunit.xml",
    "karma.conf.js",
    "jest.config.js",
    "cypress.json",
    "playwright.config.js",
    "nginx.conf",
    "serverless.yml",
    "netlify.toml",
    "vercel.json",
    "fly.toml",
    "heroku.yml",
    "app.yaml",
    "chart.yaml",
    "values.yaml",
    "kustomization.yaml",
    "terraform.tf",
    "main.tf",
    "buildspec.yml",
    "appspec.yml",
    "cloudbuild.yaml",
    "lerna.json",
    "rush.json",
    "nx.json",
    "deno.json",
    "bun.lockb",
];

/// Recognized entry-point filenames.
pub const ENTRY_POINTS: &[&str] = &["main.py", "index.js", "app.py", "server.js", "app.js"];

/// Extensions (with leading dot) treated as configuration.
pub const CONFIG_EXTENSIONS: &[&str] =
    &[".json", ".yaml", ".yml", ".toml", ".ini", ".cfg", ".config"];

/// Extensions (with leading dot) treated as source code. Disjoint from
/// `CONFIG_EXTENSIONS` so the two bonuses never stack on one rule.
pub const CODE_FILE_EXTENSIONS: &[&str] = &[
    ".py", ".pyw", ".pyx", ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".html", ".htm", ".css",
    ".scss", ".sass", ".less", ".rb", ".rake", ".gemspec", ".java", ".c", ".cpp", ".cc", ".cxx",
    ".h", ".hpp", ".cs", ".go", ".rs", ".php", ".swift", ".kt", ".kts", ".sql", ".sh", ".bash",
    ".zsh", ".fish",
];

/// One entry in the fixed custom-command catalog.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// A category of custom commands with its member commands.
#[derive(Debug, Clone, Copy)]
pub struct CommandCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub commands: &'static [CommandSpec],
}

/// Fixed catalog of custom commands the commands generator asks the LLM to
/// fill in. Categories or commands outside this catalog are ignored in the
/// response.
pub const COMMAND_CATALOG: &[CommandCategory] = &[
    CommandCategory {
        name: "code-review",
        description: "Commands for reviewing code and pull requests",
        commands: &[
            CommandSpec {
                name: "review-file",
                description: "Review a specific file in the codebase for issues and improvements",
            },
            CommandSpec {
                name: "review-pr",
                description: "Review a pull request and provide comprehensive feedback",
            },
        ],
    },
    CommandCategory {
        name: "test-generation",
        description: "Commands for generating different types of tests",
        commands: &[
            CommandSpec {
                name: "generate-unit-tests",
                description: "Generate comprehensive unit tests for a specific file or function",
            },
            CommandSpec {
                name: "generate-integration-tests",
                description: "Generate integration tests to verify interactions between components",
            },
        ],
    },
    CommandCategory {
        name: "git-workflow",
        description: "Commands for Git-related tasks and workflows",
        commands: &[
            CommandSpec {
                name: "prepare-commit",
                description: "Prepare a well-formatted Git commit message for your changes",
            },
            CommandSpec {
                name: "create-pr",
                description: "Create a well-structured pull request with a comprehensive description",
            },
        ],
    },
    CommandCategory {
        name: "refactoring",
        description: "Commands for improving code structure and quality",
        commands: &[
            CommandSpec {
                name: "refactor-file",
                description: "Improve the structure and readability of a file while preserving functionality",
            },
            CommandSpec {
                name: "extract-function",
                description: "Extract a section of code into a separate, reusable function",
            },
        ],
    },
    CommandCategory {
        name: "documentation",
        description: "Commands for generating and improving documentation",
        commands: &[
            CommandSpec {
                name: "document-code",
                description: "Add or improve documentation for code files, functions, or classes",
            },
            CommandSpec {
                name: "generate-readme",
                description: "Generate a comprehensive README file for the project",
            },
        ],
    },
];

/// Looks up a catalog category by name.
pub fn catalog_category(name: &str) -> Option<&'static CommandCategory> {
    COMMAND_CATALOG.iter().find(|c| c.name == name)
}
