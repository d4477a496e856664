//! cc-bootstrap: generates Claude Code configuration assets for a project
//!
//! The pipeline samples a bounded, representative subset of a project's file
//! tree under strict size budgets, optionally enriches it with registry
//! lookups and research, and drives a multi-step generation workflow against
//! a pluggable LLM backend with consistent error/skip semantics and
//! idempotent writes.

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod fs;
pub mod generators;
pub mod llm;
pub mod registry;
pub mod research;
pub mod workflow;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
