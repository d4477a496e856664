//! Optional research stage
//!
//! Generates project-specific questions with the LLM, answers them through
//! an external Q&A API, and flattens the findings into a text block for
//! prompt injection. The whole stage is best-effort: any failure shrinks the
//! result set instead of aborting the workflow.

pub mod client;
pub mod questions;

pub use client::ResearchClient;
pub use questions::QuestionGenerator;

/// One answered (or failed) research question.
#[derive(Debug, Clone)]
pub struct ResearchFinding {
    pub question: String,
    /// `Err` carries the failure description; it still appears in the
    /// formatted insights so the reader knows the question went unanswered.
    pub answer: Result<String, String>,
}

/// All findings from one research run.
#[derive(Debug, Clone, Default)]
pub struct ResearchResults {
    pub findings: Vec<ResearchFinding>,
}

impl ResearchResults {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.findings.iter().filter(|f| f.answer.is_ok()).count()
    }

    /// Flattens the findings into the block injected into generation prompts.
    pub fn format_insights(&self) -> String {
        self.findings
            .iter()
            .map(|finding| {
                let answer = match &finding.answer {
                    Ok(text) => text.clone(),
                    Err(e) => format!("Error fetching answer: {e}"),
                };
                format!(
                    "Research Question: {}\nResearch Finding:\n{answer}\n---\n",
                    finding.question
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_insights_includes_failures() {
        let results = ResearchResults {
            findings: vec![
                ResearchFinding {
                    question: "How does X work?".to_string(),
                    answer: Ok("Via Y.".to_string()),
                },
                ResearchFinding {
                    question: "What about Z?".to_string(),
                    answer: Err("timeout".to_string()),
                },
            ],
        };

        let insights = results.format_insights();
        assert!(insights.contains("Research Question: How does X work?"));
        assert!(insights.contains("Research Finding:\nVia Y."));
        assert!(insights.contains("Error fetching answer: timeout"));
        assert_eq!(insights.matches("---").count(), 2);
        assert_eq!(results.answered_count(), 1);
    }

    #[test]
    fn test_empty_results() {
        let results = ResearchResults::default();
        assert!(results.is_empty());
        assert_eq!(results.format_insights(), "");
    }
}
