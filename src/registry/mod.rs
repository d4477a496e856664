//! MCP registry client
//!
//! Fetches server descriptors from a Smithery-style registry. Every network
//! failure degrades to `None`/empty results with a warning; a registry outage
//! must never abort the workflow.

pub mod stdio;

pub use stdio::{recover_launch, StdioLaunch};

use crate::config::{REGISTRY_API_BASE_URL, REQUEST_TIMEOUT_SECS};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use strsim::jaro_winkler;
use tracing::{debug, info, warn};

/// Search results fetched per query.
const SEARCH_PAGE_SIZE: usize = 5;

/// One connection option advertised by a registry server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "type", default)]
    pub transport: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub stdio_function: Option<String>,
    #[serde(default)]
    pub config_schema: Option<Value>,
}

/// A resolved registry server.
#[derive(Debug, Clone, Default)]
pub struct ServerDescriptor {
    pub qualified_name: String,
    pub display_name: String,
    pub description: String,
    pub connections: Vec<Connection>,
    /// Human-readable summary of the configuration schema, for prompts.
    pub config_summary: Option<String>,
    /// Set when the descriptor was found through search rather than a direct
    /// name lookup; holds the original query.
    pub matched_from_query: Option<String>,
}

impl ServerDescriptor {
    /// The preferred connection: stdio over http, first of each kind.
    pub fn preferred_connection(&self) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.transport == "stdio")
            .or_else(|| self.connections.iter().find(|c| c.transport == "http"))
    }
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "qualifiedName", default)]
    qualified_name: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    connections: Vec<Connection>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    servers: Vec<SearchHit>,
}

/// One hit from a registry search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "qualifiedName", default)]
    pub qualified_name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// HTTP client for the MCP registry.
pub struct RegistryClient {
    base_url: String,
    api_token: String,
    http_client: Client,
}

impl RegistryClient {
    pub fn new(api_token: String) -> Self {
        Self::with_base_url(api_token, REGISTRY_API_BASE_URL.to_string())
    }

    pub fn with_base_url(api_token: String, base_url: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            api_token,
            http_client,
        }
    }

    /// Fetches a server descriptor by qualified name. Any failure (network,
    /// status, parse) warns and returns `None`.
    pub async fn get_server(&self, qualified_name: &str) -> Option<ServerDescriptor> {
        let url = format!("{}/servers/{qualified_name}", self.base_url);
        debug!(server = qualified_name, "Fetching registry descriptor");

        let response = match self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(server = qualified_name, error = %e, "Registry request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(server = qualified_name, status = %response.status(), "Registry lookup miss");
            return None;
        }

        let raw: RawServer = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                warn!(server = qualified_name, error = %e, "Invalid registry response");
                return None;
            }
        };

        let descriptor = build_descriptor(qualified_name, raw);
        if descriptor.connections.is_empty() {
            warn!(server = qualified_name, "Registry entry has no connections, dropping");
            return None;
        }

        Some(descriptor)
    }

    /// Builds the search request; query parameters are percent-encoded by
    /// the client, so non-ASCII queries survive intact.
    fn search_request(&self, query: &str) -> reqwest::RequestBuilder {
        let page_size = SEARCH_PAGE_SIZE.to_string();
        self.http_client
            .get(format!("{}/servers", self.base_url))
            .query(&[("q", query), ("page", "1"), ("pageSize", &page_size)])
            .bearer_auth(&self.api_token)
    }

    /// Free-text search. Failures degrade to an empty hit list.
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        debug!(query, "Searching registry");

        let response = match self.search_request(query).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(query, error = %e, "Registry search failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(query, status = %response.status(), "Registry search returned error status");
            return Vec::new();
        }

        match response.json::<SearchResponse>().await {
            Ok(results) => {
                info!(query, hits = results.servers.len(), "Registry search completed");
                results.servers
            }
            Err(e) => {
                warn!(query, error = %e, "Invalid registry search response");
                Vec::new()
            }
        }
    }

    /// Resolves a query to a qualified name: direct lookup first, then search
    /// with the hits ranked by name similarity to the query.
    pub async fn find_best_match(&self, query: &str) -> Option<String> {
        if self.get_server(query).await.is_some() {
            info!(query, "Exact registry match");
            return Some(query.to_string());
        }

        let hits = self.search(query).await;
        let best = rank_hits(query, &hits)?;
        info!(query, matched = %best, "Best registry match via search");
        Some(best)
    }

    /// Resolves every query to a descriptor (or `None`), preserving the
    /// caller's query strings as keys.
    pub async fn fetch_all(&self, queries: &[String]) -> BTreeMap<String, Option<ServerDescriptor>> {
        info!(queries = queries.len(), "Resolving MCP server queries");

        let mut results = BTreeMap::new();
        for query in queries {
            let descriptor = match self.find_best_match(query).await {
                Some(matched) => self.get_server(&matched).await.map(|mut d| {
                    if matched != *query {
                        d.matched_from_query = Some(query.clone());
                    }
                    d
                }),
                None => {
                    warn!(query = %query, "No registry match found");
                    None
                }
            };
            results.insert(query.clone(), descriptor);
        }
        results
    }
}

fn build_descriptor(requested: &str, raw: RawServer) -> ServerDescriptor {
    let qualified_name = raw
        .qualified_name
        .or(raw.name)
        .unwrap_or_else(|| requested.to_string());
    let display_name = raw.display_name.unwrap_or_else(|| qualified_name.clone());

    let config_summary = raw
        .connections
        .iter()
        .find_map(|c| c.config_schema.as_ref())
        .and_then(summarize_config_schema);

    ServerDescriptor {
        qualified_name,
        display_name,
        description: raw.description.unwrap_or_default(),
        connections: raw.connections,
        config_summary,
        matched_from_query: None,
    }
}

/// Ranks search hits by Jaro-Winkler similarity between query and qualified
/// name, using the better of the qualified and display names.
fn rank_hits(query: &str, hits: &[SearchHit]) -> Option<String> {
    let query_lower = query.to_lowercase();
    hits.iter()
        .filter(|hit| !hit.qualified_name.is_empty())
        .max_by(|a, b| {
            let sa = hit_similarity(&query_lower, a);
            let sb = hit_similarity(&query_lower, b);
            sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|hit| hit.qualified_name.clone())
}

fn hit_similarity(query_lower: &str, hit: &SearchHit) -> f64 {
    let by_name = jaro_winkler(query_lower, &hit.qualified_name.to_lowercase());
    let by_display = jaro_winkler(query_lower, &hit.display_name.to_lowercase());
    by_name.max(by_display)
}

/// Extracts a short human-readable summary from a JSON schema: required
/// parameter names plus per-parameter type and description.
pub fn summarize_config_schema(schema: &Value) -> Option<String> {
    let properties = schema.get("properties")?.as_object()?;
    if properties.is_empty() {
        return None;
    }

    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut lines = Vec::new();
    for (name, details) in properties {
        let kind = details
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("unknown");
        let description = details
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("");
        let marker = if required.contains(&name.as_str()) {
            " (required)"
        } else {
            ""
        };
        let mut line = format!("{name}{marker}: {kind} {description}")
            .trim_end()
            .to_string();
        if let Some(default) = details.get("default").filter(|d| !d.is_null()) {
            line.push_str(&format!(" (default: {default})"));
        }
        lines.push(line);
    }

    Some(lines.join("; "))
}
