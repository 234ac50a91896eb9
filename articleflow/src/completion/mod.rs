//! Completion client: "send prompt, get text" against a generative model.
//!
//! The [`CompletionProvider`] trait is the seam between the pipeline and a
//! concrete model backend. [`CompletionClient`] owns the generation
//! parameters, installs a provider exactly once, and brackets every call
//! with structured log events.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::errors::CompletionError;
#[cfg(feature = "gemini")]
use crate::errors::ArticleflowError;
use crate::observability::SpanTimer;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling top-p.
    pub top_p: f32,
    /// Top-k sampling.
    pub top_k: u32,
    /// Maximum output tokens.
    pub max_output_tokens: u32,
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Protocol for text-generation backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns a short provider name for logs.
    fn name(&self) -> &str;

    /// Sends a prompt and returns the generated text.
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError>;
}

/// Client wrapping a single provider with fixed generation parameters.
///
/// Constructed uninitialized; [`CompletionClient::initialize`] installs the
/// provider. A second initialization is a logged no-op.
pub struct CompletionClient {
    config: GenerationConfig,
    params: GenerationParams,
    provider: RwLock<Option<Arc<dyn CompletionProvider>>>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("model", &self.params.model)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl CompletionClient {
    /// Creates an uninitialized client.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        let params = GenerationParams::from(&config);
        Self {
            config,
            params,
            provider: RwLock::new(None),
        }
    }

    /// Creates a client that is already initialized with `provider`.
    #[must_use]
    pub fn with_provider(config: GenerationConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let client = Self::new(config);
        client.initialize(provider);
        client
    }

    /// Installs the provider. Returns false if one was already installed.
    pub fn initialize(&self, provider: Arc<dyn CompletionProvider>) -> bool {
        let mut slot = self.provider.write();
        if slot.is_some() {
            info!(model = %self.params.model, "Completion client is already initialized");
            return false;
        }

        info!(
            provider = provider.name(),
            model = %self.params.model,
            temperature = self.params.temperature,
            max_output_tokens = self.params.max_output_tokens,
            "Completion client initialized"
        );
        *slot = Some(provider);
        true
    }

    /// Installs a Gemini provider built from the client's configuration.
    #[cfg(feature = "gemini")]
    pub fn initialize_gemini(&self, api_key: impl Into<String>) -> Result<bool, ArticleflowError> {
        if self.is_initialized() {
            info!(model = %self.params.model, "Completion client is already initialized");
            return Ok(false);
        }
        let provider = GeminiProvider::new(api_key, &self.config)?;
        Ok(self.initialize(Arc::new(provider)))
    }

    /// Returns true once a provider is installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.provider.read().is_some()
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.params.model
    }

    /// Returns the generation parameters.
    #[must_use]
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Returns the generation config.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Sends one prompt to the model.
    ///
    /// Fails with an empty-response error if the model returns only
    /// whitespace. Does not retry; see [`crate::retry::RetryPolicy`].
    pub async fn complete(&self, prompt: &str, stage: &str) -> Result<String, CompletionError> {
        let provider = self
            .provider
            .read()
            .clone()
            .ok_or_else(CompletionError::not_initialized)?;

        let timer = SpanTimer::start(stage);
        info!(stage, prompt_len = prompt.len(), model = %self.params.model, "Model call started");

        let result = provider
            .complete(prompt, &self.params)
            .await
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(CompletionError::empty_response())
                } else {
                    Ok(text)
                }
            });

        let duration_ms = timer.finish();
        match &result {
            Ok(text) => info!(
                stage,
                response_len = text.len(),
                duration_ms,
                "Model call succeeded"
            ),
            Err(err) => warn!(
                stage,
                status = ?err.status,
                error = %err,
                duration_ms,
                "Model call failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompletionErrorKind;

    fn mock_returning(text: &'static str) -> MockCompletionProvider {
        let mut mock = MockCompletionProvider::new();
        mock.expect_name().return_const("mock".to_string());
        mock.expect_complete()
            .returning(move |_, _| Ok(text.to_string()));
        mock
    }

    #[tokio::test]
    async fn test_complete_before_initialize_fails() {
        let client = CompletionClient::new(GenerationConfig::default());
        let err = client.complete("hi", "Stage 1").await.unwrap_err();
        assert_eq!(err.kind, CompletionErrorKind::NotInitialized);
    }

    #[tokio::test]
    async fn test_complete_passes_params() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_name().return_const("mock".to_string());
        mock.expect_complete()
            .withf(|prompt, params| prompt == "hello" && params.model == "custom" && params.top_k == 40)
            .times(1)
            .returning(|_, _| Ok("world".to_string()));

        let config = GenerationConfig::default().with_model("custom");
        let client = CompletionClient::with_provider(config, Arc::new(mock));

        let text = client.complete("hello", "Stage 1").await.unwrap();
        assert_eq!(text, "world");
    }

    #[tokio::test]
    async fn test_whitespace_response_is_empty_response() {
        let client = CompletionClient::with_provider(
            GenerationConfig::default(),
            Arc::new(mock_returning("  \n\t ")),
        );

        let err = client.complete("hello", "Stage 1").await.unwrap_err();
        assert!(err.is_empty_response());
    }

    #[test]
    fn test_second_initialize_is_noop() {
        let client = CompletionClient::new(GenerationConfig::default());
        assert!(!client.is_initialized());

        assert!(client.initialize(Arc::new(mock_returning("first"))));
        assert!(!client.initialize(Arc::new(mock_returning("second"))));
        assert!(client.is_initialized());

        let text = tokio_test::block_on(client.complete("p", "Stage 1")).unwrap();
        assert_eq!(text, "first");
    }

    #[test]
    fn test_params_from_config() {
        let config = GenerationConfig::default()
            .with_temperature(0.1)
            .with_max_output_tokens(512);
        let params = GenerationParams::from(&config);

        assert_eq!(params.model, "gemini-2.5-flash");
        assert!((params.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 512);
    }
}
