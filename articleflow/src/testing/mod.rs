//! Testing utilities for article pipelines.
//!
//! This module provides:
//! - A scripted completion provider
//! - Canned stage responses

pub mod fixtures;
mod scripted;

pub use scripted::ScriptedProvider;
