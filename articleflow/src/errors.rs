//! Error types for the articleflow pipeline.
//!
//! Errors are layered from the innermost (raw provider failures) to the
//! outermost (stage-labeled, user-facing errors surfaced to callers).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for articleflow operations.
///
/// Every variant renders as a single human-readable sentence that names
/// the stage it originated from, when there is one.
#[derive(Debug, Clone, Error)]
pub enum ArticleflowError {
    /// The model returned an empty or whitespace-only response.
    #[error("Empty response from the model ({stage})")]
    EmptyResponse {
        /// Stage label.
        stage: String,
    },

    /// Nothing remained of the model output after stripping code fences.
    #[error("Empty JSON payload from the model ({stage})")]
    EmptyPayload {
        /// Stage label.
        stage: String,
    },

    /// The model output was not valid JSON.
    #[error("Failed to process {stage}: {reason}. Raw response: {preview}...")]
    MalformedPayload {
        /// Stage label.
        stage: String,
        /// Underlying parse error.
        reason: String,
        /// Bounded preview of the offending text.
        preview: String,
    },

    /// Parsed stage output did not match the stage schema.
    #[error("Invalid response in {stage}: {}", .violations.join("; "))]
    SchemaViolation {
        /// Stage label.
        stage: String,
        /// Every violation found.
        violations: Vec<String>,
    },

    /// The upstream model service failed.
    #[error("{0}")]
    Upstream(#[from] UpstreamServiceError),

    /// The completion client was used before initialization.
    #[error("Completion client is not initialized; call initialize() first")]
    NotInitialized,

    /// The inbound request failed validation.
    #[error("{}", .violations.join("; "))]
    InvalidRequest {
        /// Every violation found.
        violations: Vec<String>,
    },

    /// The whole operation exceeded the caller-side timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that was aborted.
        operation: String,
        /// The timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ArticleflowError {
    /// Creates a schema violation error.
    #[must_use]
    pub fn schema_violation(stage: impl Into<String>, violations: Vec<String>) -> Self {
        Self::SchemaViolation {
            stage: stage.into(),
            violations,
        }
    }

    /// Returns the stage label the error originated from, if any.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::EmptyResponse { stage }
            | Self::EmptyPayload { stage }
            | Self::MalformedPayload { stage, .. }
            | Self::SchemaViolation { stage, .. } => Some(stage),
            Self::Upstream(err) => Some(&err.stage),
            Self::NotInitialized
            | Self::InvalidRequest { .. }
            | Self::Timeout { .. }
            | Self::Configuration(_) => None,
        }
    }

    /// Returns a stable machine-readable code for the error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyResponse { .. } => codes::EMPTY_RESPONSE,
            Self::EmptyPayload { .. } => codes::EMPTY_PAYLOAD,
            Self::MalformedPayload { .. } => codes::MALFORMED_PAYLOAD,
            Self::SchemaViolation { .. } => codes::SCHEMA_VIOLATION,
            Self::Upstream(err) => err.kind.code(),
            Self::NotInitialized => codes::NOT_INITIALIZED,
            Self::InvalidRequest { .. } => codes::INVALID_REQUEST,
            Self::Timeout { .. } => codes::TIMEOUT,
            Self::Configuration(_) => codes::CONFIGURATION,
        }
    }

    /// Converts to a dictionary representation for API responses.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Some(stage) = self.stage() {
            map.insert("stage".to_string(), serde_json::json!(stage));
        }
        map
    }
}

/// User-facing category of an upstream model failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamErrorKind {
    /// The configured model does not exist or is unsupported (404).
    ModelNotFound,
    /// The service is overloaded or rate limited (429, 503).
    Overloaded,
    /// The request was rejected as invalid (400).
    InvalidRequest,
    /// The credentials lack permission (401, 403).
    PermissionDenied,
    /// Anything else.
    Unexpected,
}

impl UpstreamErrorKind {
    /// Classifies an HTTP-like status code.
    #[must_use]
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(404) => Self::ModelNotFound,
            Some(429 | 503) => Self::Overloaded,
            Some(400) => Self::InvalidRequest,
            Some(401 | 403) => Self::PermissionDenied,
            _ => Self::Unexpected,
        }
    }

    /// Returns the stable code for this kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModelNotFound => codes::UPSTREAM_MODEL_NOT_FOUND,
            Self::Overloaded => codes::UPSTREAM_OVERLOADED,
            Self::InvalidRequest => codes::UPSTREAM_INVALID_REQUEST,
            Self::PermissionDenied => codes::UPSTREAM_PERMISSION_DENIED,
            Self::Unexpected => codes::UPSTREAM_UNEXPECTED,
        }
    }
}

/// A stage-labeled upstream failure translated for the caller.
#[derive(Debug, Clone, Error)]
pub struct UpstreamServiceError {
    /// Stage label.
    pub stage: String,
    /// Failure category.
    pub kind: UpstreamErrorKind,
    /// Raw failure message from the provider.
    pub message: String,
    /// Model identifier in use when the failure happened.
    pub model: String,
}

impl UpstreamServiceError {
    /// Translates a raw completion failure into a user-facing error.
    #[must_use]
    pub fn from_completion(
        stage: impl Into<String>,
        model: impl Into<String>,
        err: &CompletionError,
    ) -> Self {
        Self {
            stage: stage.into(),
            kind: UpstreamErrorKind::from_status(err.status),
            message: err.message.clone(),
            model: model.into(),
        }
    }
}

impl fmt::Display for UpstreamServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UpstreamErrorKind::ModelNotFound => write!(
                f,
                "Model {} was not found or is not supported in your region ({})",
                self.model, self.stage
            ),
            UpstreamErrorKind::Overloaded => write!(
                f,
                "The model service is overloaded. Please try again in a few minutes ({})",
                self.stage
            ),
            UpstreamErrorKind::InvalidRequest => {
                write!(f, "Invalid request to the model ({}): {}", self.stage, self.message)
            }
            UpstreamErrorKind::PermissionDenied => write!(
                f,
                "Insufficient permissions for the model API ({}). Check the API key configuration",
                self.stage
            ),
            UpstreamErrorKind::Unexpected => {
                write!(f, "Unexpected model API error ({}): {}", self.stage, self.message)
            }
        }
    }
}

/// Category of a raw completion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionErrorKind {
    /// The model returned nothing.
    EmptyResponse,
    /// The request never produced an HTTP response.
    Transport,
    /// The service answered with an error status.
    Api,
    /// The response body could not be decoded.
    Decode,
    /// No provider has been installed on the client.
    NotInitialized,
}

/// A raw failure from a completion provider, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompletionError {
    /// Failure category.
    pub kind: CompletionErrorKind,
    /// HTTP-like status code, when the service returned one.
    pub status: Option<u16>,
    /// Failure message.
    pub message: String,
}

impl CompletionError {
    /// Creates an empty-response error.
    #[must_use]
    pub fn empty_response() -> Self {
        Self {
            kind: CompletionErrorKind::EmptyResponse,
            status: None,
            message: "Empty response from the model".to_string(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: CompletionErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    /// Creates an API error with a status code.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: CompletionErrorKind::Api,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: CompletionErrorKind::Decode,
            status: None,
            message: message.into(),
        }
    }

    /// Creates a not-initialized error.
    #[must_use]
    pub fn not_initialized() -> Self {
        Self {
            kind: CompletionErrorKind::NotInitialized,
            status: None,
            message: "Completion client is not initialized".to_string(),
        }
    }

    /// Translates the raw failure into the stage-labeled error surfaced to callers.
    #[must_use]
    pub fn into_stage_error(self, stage: &str, model: &str) -> ArticleflowError {
        match self.kind {
            CompletionErrorKind::EmptyResponse => ArticleflowError::EmptyResponse {
                stage: stage.to_string(),
            },
            CompletionErrorKind::NotInitialized => ArticleflowError::NotInitialized,
            CompletionErrorKind::Transport
            | CompletionErrorKind::Api
            | CompletionErrorKind::Decode => {
                UpstreamServiceError::from_completion(stage, model, &self).into()
            }
        }
    }

    /// Returns true if this is an empty-response failure.
    #[must_use]
    pub fn is_empty_response(&self) -> bool {
        self.kind == CompletionErrorKind::EmptyResponse
    }
}

/// Stable error codes.
pub mod codes {
    /// Model returned nothing.
    pub const EMPTY_RESPONSE: &str = "ARTICLE-001-EMPTY_RESPONSE";
    /// Nothing left after fence stripping.
    pub const EMPTY_PAYLOAD: &str = "ARTICLE-002-EMPTY_PAYLOAD";
    /// Invalid JSON.
    pub const MALFORMED_PAYLOAD: &str = "ARTICLE-002-MALFORMED_PAYLOAD";
    /// Stage schema mismatch.
    pub const SCHEMA_VIOLATION: &str = "ARTICLE-003-SCHEMA";
    /// Unknown or unsupported model.
    pub const UPSTREAM_MODEL_NOT_FOUND: &str = "ARTICLE-004-MODEL_NOT_FOUND";
    /// Service overloaded.
    pub const UPSTREAM_OVERLOADED: &str = "ARTICLE-004-OVERLOADED";
    /// Rejected request.
    pub const UPSTREAM_INVALID_REQUEST: &str = "ARTICLE-004-INVALID_REQUEST";
    /// Missing permission.
    pub const UPSTREAM_PERMISSION_DENIED: &str = "ARTICLE-004-PERMISSION";
    /// Anything else upstream.
    pub const UPSTREAM_UNEXPECTED: &str = "ARTICLE-004-UNEXPECTED";
    /// Client used before initialization.
    pub const NOT_INITIALIZED: &str = "ARTICLE-005-NOT_INITIALIZED";
    /// Inbound request rejected.
    pub const INVALID_REQUEST: &str = "ARTICLE-006-INVALID_REQUEST";
    /// Caller-side timeout.
    pub const TIMEOUT: &str = "ARTICLE-007-TIMEOUT";
    /// Bad configuration.
    pub const CONFIGURATION: &str = "ARTICLE-008-CONFIG";
}
