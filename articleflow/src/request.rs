//! Inbound request contract and validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::config::ValidationConfig;
use crate::errors::ArticleflowError;

#[allow(clippy::expect_used)]
static SUBJECT_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\s\-\x{0100}-\x{017F}\x{0180}-\x{024F}\x{1E00}-\x{1EFF}]+$")
        .expect("valid subject pattern")
});

#[allow(clippy::expect_used)]
static LOOKS_LIKE_HTML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z][\s\S]*>").expect("valid html pattern"));

/// Requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Run the full five-stage pipeline.
    GenerateArticle,
    /// Summarize an existing article.
    SummarizeArticle,
    /// Expand one section of an existing article.
    ExpandSection,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GenerateArticle => "generateArticle",
            Self::SummarizeArticle => "summarizeArticle",
            Self::ExpandSection => "expandSection",
        })
    }
}

/// A request as received from the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Requested operation.
    pub action: Action,
    /// Subject of a new article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// HTML of an existing article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_content: Option<String>,
    /// Section to expand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
}

/// A request that passed validation, with every text field HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedRequest {
    /// Generate a new article.
    Generate {
        /// Escaped subject.
        subject: String,
    },
    /// Summarize an article.
    Summarize {
        /// Escaped article content.
        article_content: String,
    },
    /// Expand one section.
    Expand {
        /// Escaped article content.
        article_content: String,
        /// Escaped section title.
        section_title: String,
    },
}

impl ValidatedRequest {
    /// Returns the requested action.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Generate { .. } => Action::GenerateArticle,
            Self::Summarize { .. } => Action::SummarizeArticle,
            Self::Expand { .. } => Action::ExpandSection,
        }
    }
}

impl GenerationRequest {
    /// Creates a generate request.
    #[must_use]
    pub fn generate(subject: impl Into<String>) -> Self {
        Self {
            action: Action::GenerateArticle,
            subject: Some(subject.into()),
            article_content: None,
            section_title: None,
        }
    }

    /// Creates a summarize request.
    #[must_use]
    pub fn summarize(article_content: impl Into<String>) -> Self {
        Self {
            action: Action::SummarizeArticle,
            subject: None,
            article_content: Some(article_content.into()),
            section_title: None,
        }
    }

    /// Creates an expand request.
    #[must_use]
    pub fn expand(article_content: impl Into<String>, section_title: impl Into<String>) -> Self {
        Self {
            action: Action::ExpandSection,
            subject: None,
            article_content: Some(article_content.into()),
            section_title: Some(section_title.into()),
        }
    }

    /// Checks the request and returns its escaped, action-specific form.
    ///
    /// Every violation is collected and reported in one
    /// [`ArticleflowError::InvalidRequest`].
    pub fn validate(&self, config: &ValidationConfig) -> Result<ValidatedRequest, ArticleflowError> {
        let mut violations = Vec::new();

        match (&self.subject, self.action) {
            (Some(subject), _) => check_subject(subject, config, &mut violations),
            (None, Action::GenerateArticle) => {
                violations.push("Subject is required to generate an article".to_string());
            }
            (None, _) => {}
        }

        let needs_content = matches!(self.action, Action::SummarizeArticle | Action::ExpandSection);
        match &self.article_content {
            Some(content) if !LOOKS_LIKE_HTML.is_match(content) => {
                violations.push("Article content does not look like valid HTML".to_string());
            }
            None if needs_content => {
                violations.push("Article content is required for this action".to_string());
            }
            _ => {}
        }

        if self.action == Action::ExpandSection && self.section_title.is_none() {
            violations.push("Section title is required to expand a section".to_string());
        }

        if !violations.is_empty() {
            tracing::warn!(action = %self.action, violations = ?violations, "Input validation failed");
            return Err(ArticleflowError::InvalidRequest { violations });
        }

        let escaped = |field: &Option<String>| field.as_deref().map(escape_html).unwrap_or_default();
        Ok(match self.action {
            Action::GenerateArticle => ValidatedRequest::Generate {
                subject: escaped(&self.subject),
            },
            Action::SummarizeArticle => ValidatedRequest::Summarize {
                article_content: escaped(&self.article_content),
            },
            Action::ExpandSection => ValidatedRequest::Expand {
                article_content: escaped(&self.article_content),
                section_title: escaped(&self.section_title),
            },
        })
    }
}

fn check_subject(subject: &str, config: &ValidationConfig, violations: &mut Vec<String>) {
    let len = subject.chars().count();
    if len < config.subject_min_length {
        violations.push(format!(
            "Subject must be at least {} characters",
            config.subject_min_length
        ));
    }
    if len > config.subject_max_length {
        violations.push(format!(
            "Subject may be at most {} characters",
            config.subject_max_length
        ));
    }
    if !SUBJECT_CHARS.is_match(subject) {
        violations.push("Subject contains characters that are not allowed".to_string());
    }
}

/// Replaces HTML-significant characters with entities.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ValidationConfig {
        ValidationConfig::default()
    }

    fn violations(request: &GenerationRequest) -> Vec<String> {
        match request.validate(&config()) {
            Err(ArticleflowError::InvalidRequest { violations }) => violations,
            other => panic!("expected invalid request, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_accepts_diacritics() {
        let validated = GenerationRequest::generate("Anxietatea la locul de muncă - ghid")
            .validate(&config())
            .unwrap();
        assert_eq!(
            validated,
            ValidatedRequest::Generate {
                subject: "Anxietatea la locul de muncă - ghid".to_string()
            }
        );
    }

    #[test]
    fn test_subject_rules_collect_all_violations() {
        assert_eq!(
            violations(&GenerationRequest::generate("a<b")),
            vec![
                "Subject must be at least 5 characters",
                "Subject contains characters that are not allowed",
            ]
        );
        assert_eq!(
            violations(&GenerationRequest::generate("x".repeat(301))),
            vec!["Subject may be at most 300 characters"]
        );
    }

    #[test]
    fn test_generate_requires_subject() {
        let request = GenerationRequest {
            subject: None,
            ..GenerationRequest::generate("unused")
        };
        assert_eq!(
            violations(&request),
            vec!["Subject is required to generate an article"]
        );
    }

    #[test]
    fn test_expand_requires_content_and_title() {
        let request = GenerationRequest {
            action: Action::ExpandSection,
            subject: None,
            article_content: None,
            section_title: None,
        };
        assert_eq!(
            violations(&request),
            vec![
                "Article content is required for this action",
                "Section title is required to expand a section",
            ]
        );
    }

    #[test]
    fn test_content_must_look_like_html() {
        assert_eq!(
            violations(&GenerationRequest::summarize("plain text only")),
            vec!["Article content does not look like valid HTML"]
        );
        assert!(GenerationRequest::summarize("<P>Upper case tags</P>")
            .validate(&config())
            .is_ok());
    }

    #[test]
    fn test_expand_escapes_fields() {
        let validated = GenerationRequest::expand("<h2>A & B</h2>", "A & \"B\"")
            .validate(&config())
            .unwrap();
        assert_eq!(
            validated,
            ValidatedRequest::Expand {
                article_content: "&lt;h2&gt;A &amp; B&lt;&#x2F;h2&gt;".to_string(),
                section_title: "A &amp; &quot;B&quot;".to_string(),
            }
        );
        assert_eq!(validated.action(), Action::ExpandSection);
    }

    #[test]
    fn test_action_wire_names() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"action": "summarizeArticle", "articleContent": "<p>x</p>"}"#)
                .unwrap();
        assert_eq!(request.action, Action::SummarizeArticle);
        assert_eq!(Action::ExpandSection.to_string(), "expandSection");
    }
}
