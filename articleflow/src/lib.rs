//! # Articleflow
//!
//! A multi-stage generative pipeline that turns a subject into a complete,
//! SEO-oriented HTML article.
//!
//! An article run has five strictly ordered stages:
//!
//! - **Research**: refine the subject and pick keywords
//! - **Outline**: propose sections, a unique angle, and meta tags
//! - **References**: gather expert concepts and source suggestions
//! - **Assembly**: render the article as HTML
//! - **Scoring**: audit the article, falling back to a fixed report on failure
//!
//! Every model call goes through a retry policy with exponential backoff,
//! and every structured response is parsed and schema-validated before the
//! next stage sees it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use articleflow::prelude::*;
//!
//! let service = ArticleService::new(ArticleflowConfig::from_env())?;
//! service.client().initialize_gemini(std::env::var("GEMINI_API_KEY")?)?;
//!
//! let outcome = service
//!     .handle(&GenerationRequest::generate("anxietatea la locul de muncă"), "user-1")
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod artifact;
pub mod completion;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod events;
pub mod html;
pub mod observability;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod retry;
pub mod service;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::artifact::{ArticleArtifact, ArtifactMetadata};
    #[cfg(feature = "gemini")]
    pub use crate::completion::GeminiProvider;
    pub use crate::completion::{CompletionClient, CompletionProvider, GenerationParams};
    pub use crate::config::{
        ArticleflowConfig, ContentConfig, GenerationConfig, LogFormat, LoggingConfig,
        RetryConfig, ValidationConfig,
    };
    pub use crate::errors::{
        ArticleflowError, CompletionError, CompletionErrorKind, UpstreamErrorKind,
        UpstreamServiceError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_logging, SpanTimer};
    pub use crate::pipeline::{ArticlePipeline, RunContext};
    pub use crate::request::{Action, GenerationRequest, ValidatedRequest};
    pub use crate::retry::RetryPolicy;
    pub use crate::service::{ActionOutcome, ArticleService};
    pub use crate::stages::{
        AuthorInsight, OutlineResult, OutlineSection, ReferencesResult, ResearchResult,
        SeoReport, StageTag,
    };
}
