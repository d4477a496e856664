//! LLM access layer: backend trait, concrete providers, and the generation
//! interface that owns templates, dry-run and thinking-mode policy.

pub mod anthropic;
pub mod backend;
pub mod bedrock;
pub mod factory;
pub mod interface;
pub mod mock;
pub mod prompts;
pub mod recording;

pub use backend::{BackendError, GenerationRequest, LlmBackend};
pub use factory::{create_backend, resolve_model, BackendOptions, ConfigError, Provider};
pub use interface::{GenerationResult, LlmInterface};
pub use prompts::PromptTemplate;
pub use recording::PromptRecorder;

/// Strips a Markdown code fence around a JSON payload, if present. Models
/// frequently wrap JSON responses in ```json fences despite instructions.
pub fn extract_json_block(content: &str) -> &str {
    let trimmed = content.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::extract_json_block;

    #[test]
    fn test_extract_json_block() {
        assert_eq!(extract_json_block("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(extract_json_block("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json_block("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(
            extract_json_block("Here you go:\n```json\n[]\n```\nEnjoy!"),
            "[]"
        );
    }
}
