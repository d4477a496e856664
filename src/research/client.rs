//! Research Q&A API client

use crate::config::{REQUEST_TIMEOUT_SECS, RESEARCH_API_BASE_URL, RESEARCH_MODEL};
use crate::research::{ResearchFinding, ResearchResults};
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the research Q&A API (Perplexity-compatible chat completions).
pub struct ResearchClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl ResearchClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, RESEARCH_API_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            api_key,
            http_client,
        }
    }

    /// Answers one question. Errors are returned for the caller to fold into
    /// a failed finding.
    pub async fn query(&self, question: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: RESEARCH_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: question,
            }],
        };

        debug!(question, "Querying research API");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Research API error: {status} - {body_text}"));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("No choices in research API response"))
    }

    /// Answers every question, folding per-question failures into findings.
    pub async fn research_all(&self, questions: &[String]) -> ResearchResults {
        let mut findings = Vec::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            info!(
                current = index + 1,
                total = questions.len(),
                question = %truncate_for_log(question),
                "Research query"
            );

            let answer = match self.query(question).await {
                Ok(answer) => Ok(answer),
                Err(e) => {
                    warn!(question = %truncate_for_log(question), error = %e, "Research query failed");
                    Err(e.to_string())
                }
            };

            findings.push(ResearchFinding {
                question: question.clone(),
                answer,
            });
        }

        let results = ResearchResults { findings };
        info!(
            answered = results.answered_count(),
            total = results.findings.len(),
            "Research completed"
        );
        results
    }
}

fn truncate_for_log(text: &str) -> String {
    const LIMIT: usize = 100;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(LIMIT).collect();
        format!("{prefix}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"the answer"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "the answer");
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: RESEARCH_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "q",
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"model\":\"sonar-pro\""));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short"), "short");
        let long = "q".repeat(150);
        let truncated = truncate_for_log(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 103);
    }
}
