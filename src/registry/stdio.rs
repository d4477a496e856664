//! Best-effort recovery of stdio launch parameters
//!
//! Some registry entries carry their stdio launch configuration only as an
//! embedded function-like string (a JavaScript arrow function returning a
//! config object) instead of explicit command/args fields. This module
//! structurally parses that string: a JSON parse of each extracted fragment
//! first, then a permissive literal rewrite, then giving up with `None`.
//!
//! The extraction is heuristic. Inputs outside the assumed shape can yield
//! wrong argument lists; callers must treat a recovered launch as
//! best-effort and a `None` as "skip this server".

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// A recovered stdio launch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioLaunch {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"["']?command["']?\s*:\s*["']([^"']+)["']"#).expect("valid regex")
    })
}

fn args_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"["']?args["']?\s*:\s*(\[[^\]]*\])"#).expect("valid regex")
    })
}

fn env_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"["']?env["']?\s*:\s*(\{[^}]*\})"#).expect("valid regex")
    })
}

fn config_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"config\.(\w+)").expect("valid regex"))
}

/// Attempts to recover command, args and env from an embedded function
/// string. Returns `None` when no command can be extracted.
pub fn recover_launch(function_source: &str) -> Option<StdioLaunch> {
    let command = command_re()
        .captures(function_source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())?;

    let args = args_re()
        .captures(function_source)
        .and_then(|c| c.get(1))
        .map(|m| parse_string_array(m.as_str()))
        .unwrap_or_default();

    let env = env_re()
        .captures(function_source)
        .and_then(|c| c.get(1))
        .map(|m| parse_env_object(m.as_str()))
        .unwrap_or_default();

    debug!(command = %command, args = args.len(), env = env.len(), "Recovered stdio launch");
    Some(StdioLaunch { command, args, env })
}

/// Parses an array fragment into strings: JSON first, then a permissive
/// rewrite of single-quoted JS literals.
fn parse_string_array(fragment: &str) -> Vec<String> {
    if let Some(values) = parse_json_strings(fragment) {
        return values;
    }

    let rewritten = permissive_rewrite(fragment);
    if let Some(values) = parse_json_strings(&rewritten) {
        return values;
    }

    warn!(fragment, "Could not parse argument list, treating as empty");
    Vec::new()
}

fn parse_json_strings(fragment: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(fragment).ok()?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Parses an object fragment into an env mapping. Values referencing
/// `config.<name>` are substituted from the local environment when the
/// uppercased name is set, otherwise a `${NAME}` placeholder is left for
/// the user to fill in.
fn parse_env_object(fragment: &str) -> BTreeMap<String, String> {
    let value: Option<Value> = serde_json::from_str(fragment)
        .ok()
        .or_else(|| serde_json::from_str(&permissive_rewrite(fragment)).ok());

    let object = match value.as_ref().and_then(|v| v.as_object()) {
        Some(o) => o,
        None => {
            warn!(fragment, "Could not parse env object, treating as empty");
            return BTreeMap::new();
        }
    };

    object
        .iter()
        .map(|(key, val)| {
            let raw = match val {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), substitute_config_refs(&raw))
        })
        .collect()
}

fn substitute_config_refs(raw: &str) -> String {
    config_ref_re()
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let name = caps[1].to_uppercase();
            match std::env::var(&name) {
                Ok(value) if !value.is_empty() => value,
                _ => format!("${{{name}}}"),
            }
        })
        .into_owned()
}

/// Rewrites a JS-ish literal fragment toward JSON: single quotes become
/// double quotes, `config.x` references become quoted placeholders, and
/// trailing commas are dropped.
fn permissive_rewrite(fragment: &str) -> String {
    let quoted = fragment.replace('\'', "\"");
    let no_refs = config_ref_re()
        .replace_all(&quoted, |caps: &regex::Captures<'_>| {
            format!("\"config.{}\"", &caps[1])
        })
        .into_owned();
    // Quoting references can double-quote already-quoted ones.
    let cleaned = no_refs.replace("\"\"config.", "\"config.").replace(".\"\"", ".\"");
    cleaned.replace(",]", "]").replace(",}", "}")
}
