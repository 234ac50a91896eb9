//! Configuration for the completion client, retry policy, request
//! validation, logging, and article content.
//!
//! Every value has a hard-coded default and can be overridden from the
//! process environment via [`ArticleflowConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ArticleflowError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleflowConfig {
    /// Model and sampling parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Retry and backoff parameters.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Inbound request constraints.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Article content settings.
    #[serde(default)]
    pub content: ContentConfig,
    /// Caller-side timeout for a whole operation, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    300_000
}

impl Default for ArticleflowConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            validation: ValidationConfig::default(),
            logging: LoggingConfig::default(),
            content: ContentConfig::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ArticleflowConfig {
    /// Creates a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through an arbitrary lookup function.
    ///
    /// Values that fail to parse fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            generation: GenerationConfig {
                model: get("GEMINI_MODEL").unwrap_or(defaults.generation.model),
                temperature: parse_or(get("GEMINI_TEMPERATURE"), defaults.generation.temperature),
                top_p: parse_or(get("GEMINI_TOP_P"), defaults.generation.top_p),
                top_k: parse_or(get("GEMINI_TOP_K"), defaults.generation.top_k),
                max_output_tokens: parse_or(
                    get("GEMINI_MAX_TOKENS"),
                    defaults.generation.max_output_tokens,
                ),
                api_base: get("GEMINI_API_BASE").unwrap_or(defaults.generation.api_base),
                http_timeout_seconds: parse_or(
                    get("GEMINI_HTTP_TIMEOUT"),
                    defaults.generation.http_timeout_seconds,
                ),
            },
            retry: RetryConfig {
                max_retries: parse_or(get("MAX_RETRIES"), defaults.retry.max_retries),
                base_delay_ms: parse_or(get("RETRY_DELAY"), defaults.retry.base_delay_ms),
                max_delay_ms: parse_or(get("MAX_RETRY_DELAY"), defaults.retry.max_delay_ms),
                ..defaults.retry
            },
            validation: ValidationConfig {
                subject_min_length: parse_or(
                    get("SUBJECT_MIN_LENGTH"),
                    defaults.validation.subject_min_length,
                ),
                subject_max_length: parse_or(
                    get("SUBJECT_MAX_LENGTH"),
                    defaults.validation.subject_max_length,
                ),
            },
            logging: LoggingConfig {
                level: get("LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: parse_or(get("LOG_FORMAT"), defaults.logging.format),
            },
            content: ContentConfig {
                language: get("ARTICLE_LANGUAGE").unwrap_or(defaults.content.language),
                html_lang: get("ARTICLE_HTML_LANG").unwrap_or(defaults.content.html_lang),
                contact_url: get("CONTACT_URL").unwrap_or(defaults.content.contact_url),
            },
            request_timeout_ms: parse_or(get("REQUEST_TIMEOUT"), defaults.request_timeout_ms),
        }
    }

    /// Sets the generation config.
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Sets the retry config.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Gets the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Rejects values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), ArticleflowError> {
        let mut problems = Vec::new();

        if self.retry.max_retries == 0 {
            problems.push("max_retries must be at least 1".to_string());
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            problems.push(format!(
                "base delay ({}ms) exceeds max delay ({}ms)",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            problems.push(format!(
                "temperature {} is outside [0, 2]",
                self.generation.temperature
            ));
        }
        if self.validation.subject_min_length > self.validation.subject_max_length {
            problems.push("subject min length exceeds max length".to_string());
        }
        if self.generation.http_timeout().is_err() {
            problems.push(format!(
                "HTTP timeout {}s must be a positive finite number",
                self.generation.http_timeout_seconds
            ));
        }
        if self.request_timeout_ms == 0 {
            problems.push("request timeout must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ArticleflowError::Configuration(problems.join("; ")))
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Model identifier and sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling top-p.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Top-k sampling.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Maximum output tokens.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Base URL of the generative language API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// HTTP timeout for a single model call, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: f64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    24_000
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_http_timeout() -> f64 {
    120.0
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            api_base: default_api_base(),
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

impl GenerationConfig {
    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum output tokens.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Gets the HTTP timeout as a Duration.
    ///
    /// Fails for zero, negative, or non-finite values.
    pub fn http_timeout(&self) -> Result<Duration, ArticleflowError> {
        let seconds = self.http_timeout_seconds;
        Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| {
                ArticleflowError::Configuration(format!(
                    "HTTP timeout {seconds}s must be a positive finite number"
                ))
            })
    }
}

/// Retry and backoff parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per model call (including the first).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Status codes classified as transient.
    #[serde(default = "default_retryable_status_codes")]
    pub retryable_status_codes: Vec<u16>,
    /// Lowercase message fragments classified as transient.
    #[serde(default = "default_retryable_messages")]
    pub retryable_messages: Vec<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    10_000
}

fn default_retryable_status_codes() -> Vec<u16> {
    vec![429, 502, 503, 504]
}

fn default_retryable_messages() -> Vec<String> {
    vec![
        "timeout".to_string(),
        "rate limit".to_string(),
        "quota exceeded".to_string(),
        "model is overloaded".to_string(),
    ]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            retryable_status_codes: default_retryable_status_codes(),
            retryable_messages: default_retryable_messages(),
        }
    }
}

impl RetryConfig {
    /// Creates a new retry config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay: u64) -> Self {
        self.base_delay_ms = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay_ms(mut self, delay: u64) -> Self {
        self.max_delay_ms = delay;
        self
    }
}

/// Inbound request constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum subject length in characters.
    #[serde(default = "default_subject_min")]
    pub subject_min_length: usize,
    /// Maximum subject length in characters.
    #[serde(default = "default_subject_max")]
    pub subject_max_length: usize,
}

fn default_subject_min() -> usize {
    5
}

fn default_subject_max() -> usize {
    300
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            subject_min_length: default_subject_min(),
            subject_max_length: default_subject_max(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" | "dev" => Ok(Self::Pretty),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Article content settings threaded into prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Language the article is written in.
    #[serde(default = "default_language")]
    pub language: String,
    /// Value of the article's `<html lang>` attribute.
    #[serde(default = "default_html_lang")]
    pub html_lang: String,
    /// Link used by the call-to-action block.
    #[serde(default = "default_contact_url")]
    pub contact_url: String,
}

fn default_language() -> String {
    "Romanian".to_string()
}

fn default_html_lang() -> String {
    "ro".to_string()
}

fn default_contact_url() -> String {
    "https://carina-s-blog.web.app/contact".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            html_lang: default_html_lang(),
            contact_url: default_contact_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ArticleflowConfig::new();
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.generation.max_output_tokens, 24_000);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.retry.max_delay_ms, 10_000);
        assert_eq!(config.validation.subject_min_length, 5);
        assert_eq!(config.validation.subject_max_length, 300);
        assert_eq!(config.request_timeout_ms, 300_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ArticleflowConfig::from_lookup(lookup_from(&[
            ("GEMINI_MODEL", "gemini-pro"),
            ("GEMINI_TEMPERATURE", "0.2"),
            ("MAX_RETRIES", "5"),
            ("RETRY_DELAY", "250"),
            ("LOG_FORMAT", "pretty"),
            ("REQUEST_TIMEOUT", "1000"),
        ]));

        assert_eq!(config.generation.model, "gemini-pro");
        assert!((config.generation.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.request_timeout_ms, 1000);
        assert_eq!(config.retry.retryable_status_codes, vec![429, 502, 503, 504]);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = ArticleflowConfig::from_lookup(lookup_from(&[
            ("GEMINI_TOP_K", "many"),
            ("MAX_RETRY_DELAY", ""),
            ("LOG_FORMAT", "xml"),
        ]));

        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.retry.max_delay_ms, 10_000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_collects_problems() {
        let config = ArticleflowConfig::new().with_retry(
            RetryConfig::new()
                .with_max_retries(0)
                .with_base_delay_ms(5000)
                .with_max_delay_ms(100),
        );

        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("max_retries"));
        assert!(message.contains("exceeds max delay"));
    }

    #[test]
    fn test_bad_http_timeout_is_rejected() {
        for raw in ["-1", "NaN", "inf", "0"] {
            let config =
                ArticleflowConfig::from_lookup(lookup_from(&[("GEMINI_HTTP_TIMEOUT", raw)]));

            assert!(
                matches!(config.generation.http_timeout(), Err(ArticleflowError::Configuration(_))),
                "timeout {raw} should be rejected"
            );
            let message = config.validate().unwrap_err().to_string();
            assert!(message.contains("HTTP timeout"), "{message}");
        }

        let config = ArticleflowConfig::from_lookup(lookup_from(&[("GEMINI_HTTP_TIMEOUT", "2.5")]));
        assert_eq!(
            config.generation.http_timeout().unwrap(),
            Duration::from_millis(2500)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ArticleflowConfig =
            serde_json::from_str(r#"{"generation": {"model": "m"}}"#).unwrap();
        assert_eq!(config.generation.model, "m");
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.request_timeout_ms, 300_000);
    }
}
