//! Request-level entry point: validate, dispatch, enforce the timeout.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::artifact::ArticleArtifact;
use crate::completion::{CompletionClient, CompletionProvider};
use crate::config::ArticleflowConfig;
use crate::errors::ArticleflowError;
use crate::events::EventSink;
use crate::pipeline::ArticlePipeline;
use crate::request::{GenerationRequest, ValidatedRequest};

/// Result of one handled request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "result")]
pub enum ActionOutcome {
    /// A generated article.
    #[serde(rename = "generateArticle")]
    Article(ArticleArtifact),
    /// A plain-text summary.
    #[serde(rename = "summarizeArticle")]
    Summary(String),
    /// An HTML fragment for one section.
    #[serde(rename = "expandSection")]
    Expansion(String),
}

/// Bundles configuration, the completion client, and the pipeline.
#[derive(Debug)]
pub struct ArticleService {
    config: ArticleflowConfig,
    client: Arc<CompletionClient>,
    pipeline: ArticlePipeline,
}

impl ArticleService {
    /// Creates a service with an uninitialized completion client.
    pub fn new(config: ArticleflowConfig) -> Result<Self, ArticleflowError> {
        config.validate()?;
        let client = Arc::new(CompletionClient::new(config.generation.clone()));
        let pipeline = ArticlePipeline::from_config(Arc::clone(&client), &config);
        Ok(Self {
            config,
            client,
            pipeline,
        })
    }

    /// Creates a service whose client is already initialized with `provider`.
    pub fn with_provider(
        config: ArticleflowConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, ArticleflowError> {
        let service = Self::new(config)?;
        service.client.initialize(provider);
        Ok(service)
    }

    /// Sets the sink that receives pipeline events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.pipeline = self.pipeline.with_event_sink(sink);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ArticleflowConfig {
        &self.config
    }

    /// Returns the shared completion client.
    pub fn client(&self) -> &Arc<CompletionClient> {
        &self.client
    }

    /// Returns the pipeline.
    pub fn pipeline(&self) -> &ArticlePipeline {
        &self.pipeline
    }

    /// Validates and runs one request within the configured timeout.
    ///
    /// On expiry the in-flight operation is dropped and
    /// [`ArticleflowError::Timeout`] is returned.
    pub async fn handle(
        &self,
        request: &GenerationRequest,
        requester_id: &str,
    ) -> Result<ActionOutcome, ArticleflowError> {
        let validated = request.validate(&self.config.validation)?;
        let action = validated.action();
        let timeout = self.config.request_timeout();

        info!(%action, requester_id, "Handling request");

        match tokio::time::timeout(timeout, self.dispatch(validated, requester_id)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    %action,
                    requester_id,
                    timeout_ms = self.config.request_timeout_ms,
                    "Request timed out"
                );
                Err(ArticleflowError::Timeout {
                    operation: action.to_string(),
                    timeout_ms: self.config.request_timeout_ms,
                })
            }
        }
    }

    async fn dispatch(
        &self,
        request: ValidatedRequest,
        requester_id: &str,
    ) -> Result<ActionOutcome, ArticleflowError> {
        match request {
            ValidatedRequest::Generate { subject } => self
                .pipeline
                .generate_article(&subject, requester_id)
                .await
                .map(ActionOutcome::Article),
            ValidatedRequest::Summarize { article_content } => self
                .pipeline
                .summarize_article(&article_content, requester_id)
                .await
                .map(ActionOutcome::Summary),
            ValidatedRequest::Expand {
                article_content,
                section_title,
            } => self
                .pipeline
                .expand_section(&article_content, &section_title, requester_id)
                .await
                .map(ActionOutcome::Expansion),
        }
    }
}
