//! Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionProvider, GenerationParams};
use crate::config::GenerationConfig;
use crate::errors::{ArticleflowError, CompletionError};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Completion provider backed by the Gemini REST API.
pub struct GeminiProvider {
    http: Client,
    api_key: String,
    api_base: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Builds a provider with the configured HTTP timeout.
    pub fn new(
        api_key: impl Into<String>,
        config: &GenerationConfig,
    ) -> Result<Self, ArticleflowError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ArticleflowError::Configuration(
                "Gemini API key is empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(config.http_timeout()?)
            .build()
            .map_err(|e| ArticleflowError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.api_base)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: SamplingConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplingConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, params: &GenerationParams) -> Self {
        Self {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: SamplingConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
        })
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        let url = self.endpoint(&params.model);
        debug!(model = %params.model, "Sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateRequest::new(prompt, params))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::transport(format!("Request timeout: {e}"))
                } else {
                    CompletionError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::decode(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::api(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| CompletionError::decode(e.to_string()))?;
        Ok(parsed.text())
    }
}
