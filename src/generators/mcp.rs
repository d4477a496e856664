//! MCP server config and settings generation
//!
//! The MCP config is built deterministically from the registry descriptors
//! fetched earlier in the run; no LLM call is involved. The settings
//! generator runs after it and unions one permission token per configured
//! server into `allowedTools`, reading the config file defensively since it
//! may be absent (skipped step, dry run) or malformed.

use crate::analyzers::ProjectContext;
use crate::config::{
    CLAUDE_DIR_PATH, MCP_JSON_PATH, MCP_STARTUP_TIMEOUT_MILLIS, SETTINGS_JSON_PATH,
};
use crate::fs::ProjectFs;
use crate::generators::GenerationStatus;
use crate::registry::{recover_launch, Connection, ServerDescriptor};
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Default settings content. Kept as JSON text so the parse-or-fallback path
/// matches loading an external template.
const DEFAULT_SETTINGS_TEMPLATE: &str = r#"{
  "theme": "dark",
  "allowedTools": ["Read", "LS", "Grep"],
  "autoApproveTools": ["Read", "LS", "Grep"],
  "defaultAllowedBranches": ["main"],
  "showPrompt": false,
  "telemetry": {"disabled": false}
}"#;

/// Minimal settings used when the embedded template fails to parse.
fn baseline_settings() -> Value {
    json!({
        "theme": "dark",
        "allowedTools": ["Read", "LS", "Grep"],
        "autoApproveTools": ["Read", "LS", "Grep"],
        "defaultAllowedBranches": ["main"],
        "showPrompt": false,
        "telemetry": {"disabled": false}
    })
}

#[derive(Debug, Serialize)]
struct McpServerEntry {
    transport: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    description: String,
    #[serde(rename = "startupTimeoutMillis")]
    startup_timeout_millis: u64,
}

/// Generates `.mcp.json` and `.claude/settings.json`.
pub struct ConfigGenerator<'a> {
    fs: &'a ProjectFs,
}

impl<'a> ConfigGenerator<'a> {
    pub fn new(fs: &'a ProjectFs) -> Self {
        Self { fs }
    }

    /// Builds the MCP config from resolved registry descriptors. An empty
    /// server set is still a successfully generated artifact.
    pub fn generate_mcp_config(&self, context: &ProjectContext) -> Result<GenerationStatus> {
        if self.fs.file_exists(MCP_JSON_PATH) && !self.fs.force_overwrite() {
            info!(path = MCP_JSON_PATH, "File exists, skipping");
            return Ok(GenerationStatus::skipped("already exists"));
        }

        let mut servers: BTreeMap<String, McpServerEntry> = BTreeMap::new();
        for (query, descriptor) in &context.mcp_servers {
            let descriptor = match descriptor {
                Some(descriptor) => descriptor,
                None => {
                    warn!(query = %query, "Server unresolved, not configured");
                    continue;
                }
            };

            match build_entry(descriptor) {
                Some(entry) => {
                    servers.insert(descriptor.qualified_name.clone(), entry);
                }
                None => warn!(
                    server = %descriptor.qualified_name,
                    "No usable connection, skipping server"
                ),
            }
        }

        let config = json!({ "mcpServers": servers });
        let content = serde_json::to_string_pretty(&config)?;

        let count = servers.len();
        if self.fs.write_file(MCP_JSON_PATH, &content) {
            info!(path = MCP_JSON_PATH, servers = count, "Generated successfully");
            Ok(GenerationStatus::Success(Some(format!(
                "{count} servers configured"
            ))))
        } else {
            error!(path = MCP_JSON_PATH, "Failed to write");
            Ok(GenerationStatus::failed(format!(
                "could not write {MCP_JSON_PATH}"
            )))
        }
    }

    /// Generates settings, unioning a permission token per server key found
    /// in the already-generated MCP config.
    pub fn generate_settings(&self) -> Result<GenerationStatus> {
        if self.fs.file_exists(SETTINGS_JSON_PATH) && !self.fs.force_overwrite() {
            info!(path = SETTINGS_JSON_PATH, "File exists, skipping");
            return Ok(GenerationStatus::skipped("already exists"));
        }

        if !self.fs.ensure_directory(CLAUDE_DIR_PATH) {
            return Ok(GenerationStatus::failed(format!(
                "could not create {CLAUDE_DIR_PATH}"
            )));
        }

        let mut settings: Value = match serde_json::from_str(DEFAULT_SETTINGS_TEMPLATE) {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = %e, "Default settings template invalid, using baseline");
                baseline_settings()
            }
        };

        if !settings
            .get("allowedTools")
            .map(Value::is_array)
            .unwrap_or(false)
        {
            settings["allowedTools"] = json!(["Read", "LS", "Grep"]);
        }

        self.union_mcp_permissions(&mut settings);

        let content = serde_json::to_string_pretty(&settings)?;
        if self.fs.write_file(SETTINGS_JSON_PATH, &content) {
            info!(path = SETTINGS_JSON_PATH, "Generated successfully");
            Ok(GenerationStatus::success())
        } else {
            error!(path = SETTINGS_JSON_PATH, "Failed to write");
            Ok(GenerationStatus::failed(format!(
                "could not write {SETTINGS_JSON_PATH}"
            )))
        }
    }

    /// Adds `mcp__<key>__*` per configured server. An absent or malformed
    /// config file skips only this union step.
    fn union_mcp_permissions(&self, settings: &mut Value) {
        let content = match self.fs.read_file(MCP_JSON_PATH) {
            Some(content) => content,
            None => return,
        };

        let config: Value = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = MCP_JSON_PATH, error = %e, "Could not parse MCP config, skipping permission union");
                return;
            }
        };

        let servers = match config.get("mcpServers").and_then(Value::as_object) {
            Some(servers) => servers,
            None => return,
        };

        let allowed = match settings.get_mut("allowedTools").and_then(Value::as_array_mut) {
            Some(allowed) => allowed,
            None => return,
        };

        for server_key in servers.keys() {
            let permission = format!("mcp__{}__*", sanitize_key(server_key));
            let token = Value::String(permission.clone());
            if !allowed.contains(&token) {
                info!(permission = %permission, "Added MCP tool permission");
                allowed.push(token);
            }
        }
    }
}

/// Builds the config entry for a descriptor's preferred connection. Stdio
/// wins over http; a stdio connection without an explicit command goes
/// through launch recovery; failure of both paths drops the server.
fn build_entry(descriptor: &ServerDescriptor) -> Option<McpServerEntry> {
    let connection = descriptor.preferred_connection()?;
    match connection.transport.as_str() {
        "stdio" => build_stdio_entry(descriptor, connection),
        "http" => {
            let url = connection.url.clone().filter(|u| !u.is_empty())?;
            Some(McpServerEntry {
                transport: "http",
                command: None,
                args: None,
                env: None,
                url: Some(url),
                description: descriptor.description.clone(),
                startup_timeout_millis: MCP_STARTUP_TIMEOUT_MILLIS,
            })
        }
        _ => None,
    }
}

fn build_stdio_entry(
    descriptor: &ServerDescriptor,
    connection: &Connection,
) -> Option<McpServerEntry> {
    let (command, args, env) = match &connection.command {
        Some(command) if !command.is_empty() => (
            command.clone(),
            connection.args.clone().unwrap_or_default(),
            connection.env.clone().unwrap_or_default(),
        ),
        _ => {
            let function_source = connection.stdio_function.as_deref()?;
            let launch = recover_launch(function_source)?;
            info!(server = %descriptor.qualified_name, "Recovered stdio launch from embedded function");
            (launch.command, launch.args, launch.env)
        }
    };

    Some(McpServerEntry {
        transport: "stdio",
        command: Some(command),
        args: Some(args),
        env: if env.is_empty() { None } else { Some(env) },
        url: None,
        description: descriptor.description.clone(),
        startup_timeout_millis: MCP_STARTUP_TIMEOUT_MILLIS,
    })
}

/// Maps a server key to a permission-safe token piece: every character that
/// is not ASCII alphanumeric becomes `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ProjectFs) {
        let dir = TempDir::new().unwrap();
        let fs = ProjectFs::new(dir.path().to_path_buf(), false, false);
        (dir, fs)
    }

    fn stdio_descriptor(name: &str, command: Option<&str>) -> ServerDescriptor {
        ServerDescriptor {
            qualified_name: name.to_string(),
            display_name: name.to_string(),
            description: "a server".to_string(),
            connections: vec![Connection {
                transport: "stdio".to_string(),
                command: command.map(String::from),
                args: Some(vec!["-y".to_string()]),
                ..Connection::default()
            }],
            ..ServerDescriptor::default()
        }
    }

    fn http_descriptor(name: &str, url: &str) -> ServerDescriptor {
        ServerDescriptor {
            qualified_name: name.to_string(),
            display_name: name.to_string(),
            description: "remote".to_string(),
            connections: vec![Connection {
                transport: "http".to_string(),
                url: Some(url.to_string()),
                ..Connection::default()
            }],
            ..ServerDescriptor::default()
        }
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("foo/bar"), "foo_bar");
        assert_eq!(sanitize_key("a.b-c"), "a_b_c");
        assert_eq!(sanitize_key("plain"), "plain");
    }

    #[test]
    fn test_empty_server_set_still_written() {
        let (dir, fs) = fixture();
        let generator = ConfigGenerator::new(&fs);

        let status = generator
            .generate_mcp_config(&ProjectContext::default())
            .unwrap();

        assert_eq!(
            status,
            GenerationStatus::Success(Some("0 servers configured".to_string()))
        );
        let content = std::fs::read_to_string(dir.path().join(".mcp.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert!(parsed["mcpServers"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_stdio_entry_from_explicit_command() {
        let (dir, fs) = fixture();
        let mut context = ProjectContext::default();
        context.mcp_servers.insert(
            "fetch".to_string(),
            Some(stdio_descriptor("smithery/fetch", Some("npx"))),
        );

        ConfigGenerator::new(&fs)
            .generate_mcp_config(&context)
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(".mcp.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        let entry = &parsed["mcpServers"]["smithery/fetch"];
        assert_eq!(entry["transport"], "stdio");
        assert_eq!(entry["command"], "npx");
        assert_eq!(entry["startupTimeoutMillis"], 10_000);
    }

    #[test]
    fn test_http_only_descriptor_gets_url_entry() {
        let (dir, fs) = fixture();
        let mut context = ProjectContext::default();
        context.mcp_servers.insert(
            "remote".to_string(),
            Some(http_descriptor("acme/remote", "https://acme.dev/mcp")),
        );

        ConfigGenerator::new(&fs)
            .generate_mcp_config(&context)
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(".mcp.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        let entry = &parsed["mcpServers"]["acme/remote"];
        assert_eq!(entry["transport"], "http");
        assert_eq!(entry["url"], "https://acme.dev/mcp");
        assert!(entry.get("command").is_none());
    }

    #[test]
    fn test_stdio_recovery_via_embedded_function() {
        let (dir, fs) = fixture();
        let mut descriptor = stdio_descriptor("scope/tool", None);
        descriptor.connections[0].args = None;
        descriptor.connections[0].stdio_function =
            Some("config => ({command: 'uvx', args: ['tool-server']})".to_string());

        let mut context = ProjectContext::default();
        context
            .mcp_servers
            .insert("tool".to_string(), Some(descriptor));

        let status = ConfigGenerator::new(&fs)
            .generate_mcp_config(&context)
            .unwrap();

        assert_eq!(
            status,
            GenerationStatus::Success(Some("1 servers configured".to_string()))
        );
        let content = std::fs::read_to_string(dir.path().join(".mcp.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["mcpServers"]["scope/tool"]["command"], "uvx");
    }

    #[test]
    fn test_unrecoverable_stdio_server_skipped() {
        let (dir, fs) = fixture();
        let mut broken = stdio_descriptor("scope/broken", None);
        broken.connections[0].stdio_function = Some("nothing useful here".to_string());

        let mut context = ProjectContext::default();
        context.mcp_servers.insert("broken".to_string(), Some(broken));
        context.mcp_servers.insert(
            "fetch".to_string(),
            Some(stdio_descriptor("smithery/fetch", Some("npx"))),
        );

        let status = ConfigGenerator::new(&fs)
            .generate_mcp_config(&context)
            .unwrap();

        assert_eq!(
            status,
            GenerationStatus::Success(Some("1 servers configured".to_string()))
        );
        let content = std::fs::read_to_string(dir.path().join(".mcp.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert!(parsed["mcpServers"].get("scope/broken").is_none());
        assert!(parsed["mcpServers"].get("smithery/fetch").is_some());
    }

    #[test]
    fn test_settings_union_with_config_keys() {
        let (dir, fs) = fixture();
        std::fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers": {"foo/bar": {"transport": "stdio"}}}"#,
        )
        .unwrap();

        let status = ConfigGenerator::new(&fs).generate_settings().unwrap();

        assert_eq!(status, GenerationStatus::success());
        let content =
            std::fs::read_to_string(dir.path().join(".claude/settings.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        let allowed = parsed["allowedTools"].as_array().unwrap();
        assert!(allowed.contains(&Value::String("mcp__foo_bar__*".to_string())));
        assert!(allowed.contains(&Value::String("Read".to_string())));
    }

    #[test]
    fn test_settings_tolerates_missing_config() {
        let (dir, fs) = fixture();

        let status = ConfigGenerator::new(&fs).generate_settings().unwrap();

        assert_eq!(status, GenerationStatus::success());
        let content =
            std::fs::read_to_string(dir.path().join(".claude/settings.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        let allowed = parsed["allowedTools"].as_array().unwrap();
        assert!(!allowed.iter().any(|t| {
            t.as_str().map(|s| s.starts_with("mcp__")).unwrap_or(false)
        }));
    }

    #[test]
    fn test_settings_tolerates_malformed_config() {
        let (dir, fs) = fixture();
        std::fs::write(dir.path().join(".mcp.json"), "{not json").unwrap();

        let status = ConfigGenerator::new(&fs).generate_settings().unwrap();

        assert_eq!(status, GenerationStatus::success());
        assert!(dir.path().join(".claude/settings.json").exists());
    }

    #[test]
    fn test_settings_skipped_when_present() {
        let (dir, fs) = fixture();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".claude/settings.json"), "{}").unwrap();

        let status = ConfigGenerator::new(&fs).generate_settings().unwrap();

        assert!(matches!(status, GenerationStatus::Skipped(_)));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".claude/settings.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_mcp_config_skipped_when_present() {
        let (dir, fs) = fixture();
        std::fs::write(dir.path().join(".mcp.json"), "{}").unwrap();

        let status = ConfigGenerator::new(&fs)
            .generate_mcp_config(&ProjectContext::default())
            .unwrap();

        assert!(matches!(status, GenerationStatus::Skipped(_)));
    }
}
