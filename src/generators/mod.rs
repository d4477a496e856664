//! Asset generators
//!
//! Each generator consumes the shared context, produces one output artifact
//! and reports a [`GenerationStatus`]. Environmental failures become statuses;
//! only programming defects (template rendering) escape as errors, and the
//! orchestrator converts even those into per-asset failures.

pub mod commands;
pub mod doc;
pub mod mcp;

pub use commands::CommandGenerator;
pub use doc::DocGenerator;
pub use mcp::ConfigGenerator;

use std::fmt;

/// Outcome of one asset generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    /// Asset written; the detail says what (e.g. a file count).
    Success(Option<String>),
    /// Nothing to do; the detail says why.
    Skipped(Option<String>),
    /// Some files written, some not.
    Partial {
        generated: usize,
        skipped: usize,
        errors: usize,
    },
    /// Asset not produced; the detail carries the cause.
    Failed(String),
}

impl GenerationStatus {
    pub fn success() -> Self {
        GenerationStatus::Success(None)
    }

    pub fn skipped(reason: &str) -> Self {
        GenerationStatus::Skipped(Some(reason.to_string()))
    }

    pub fn failed(cause: impl fmt::Display) -> Self {
        GenerationStatus::Failed(cause.to_string())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, GenerationStatus::Failed(_))
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStatus::Success(None) => write!(f, "Success"),
            GenerationStatus::Success(Some(detail)) => write!(f, "Success ({detail})"),
            GenerationStatus::Skipped(None) => write!(f, "Skipped"),
            GenerationStatus::Skipped(Some(detail)) => write!(f, "Skipped ({detail})"),
            GenerationStatus::Partial {
                generated,
                skipped,
                errors,
            } => write!(
                f,
                "Partial success ({generated} generated, {skipped} skipped, {errors} errors)"
            ),
            GenerationStatus::Failed(cause) => write!(f, "Failed: {cause}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(GenerationStatus::success().to_string(), "Success");
        assert_eq!(
            GenerationStatus::Success(Some("3 servers".to_string())).to_string(),
            "Success (3 servers)"
        );
        assert_eq!(
            GenerationStatus::skipped("already exists").to_string(),
            "Skipped (already exists)"
        );
        assert_eq!(
            GenerationStatus::Partial {
                generated: 4,
                skipped: 1,
                errors: 2
            }
            .to_string(),
            "Partial success (4 generated, 1 skipped, 2 errors)"
        );
        assert_eq!(
            GenerationStatus::failed("write denied").to_string(),
            "Failed: write denied"
        );
    }

    #[test]
    fn test_is_failure() {
        assert!(GenerationStatus::failed("x").is_failure());
        assert!(!GenerationStatus::success().is_failure());
        assert!(!GenerationStatus::skipped("exists").is_failure());
    }
}
