//! A completion provider that replays scripted responses.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::completion::{CompletionProvider, GenerationParams};
use crate::errors::CompletionError;

/// Replays a queue of canned responses and failures in order.
///
/// Records every prompt it receives. Once the script runs out, every call
/// fails with a non-retryable transport error.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: RwLock<Vec<String>>,
    call_count: AtomicUsize,
    latency: Option<Duration>,
}

impl ScriptedProvider {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script that returns each response in turn.
    #[must_use]
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        responses
            .into_iter()
            .fold(Self::new(), |provider, r| provider.respond(r))
    }

    /// Appends a successful response.
    #[must_use]
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(text.into()));
        self
    }

    /// Appends a failure.
    #[must_use]
    pub fn fail(self, error: CompletionError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns every prompt received, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().clone()
    }

    /// Returns the number of scripted entries not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.write().push(prompt.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| Err(CompletionError::transport("script exhausted")))
    }
}
