//! Pipeline execution for articleflow.
//!
//! This module provides:
//! - The five-stage article pipeline
//! - Summary and section-expansion calls
//! - Per-run identity for logs and events

mod context;
mod orchestrator;

#[cfg(test)]
mod orchestrator_tests;

pub use context::RunContext;
pub use orchestrator::ArticlePipeline;
