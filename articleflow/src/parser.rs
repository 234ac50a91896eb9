//! Structured-output parsing for model responses.
//!
//! Models often wrap JSON in markdown code fences. Parsing strips the fences
//! and attempts a strict JSON parse; malformed output is never repaired.

use regex::Regex;
use std::sync::LazyLock;

use crate::errors::ArticleflowError;

/// Maximum characters of raw text carried in a malformed-payload error.
pub const PREVIEW_CHARS: usize = 500;

#[allow(clippy::expect_used)]
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```(?:json)?[ \t]*\r?\n?").expect("valid fence pattern"));

#[allow(clippy::expect_used)]
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?```\s*$").expect("valid fence pattern"));

/// Removes the outer json code-fence markers and surrounding whitespace.
///
/// Fences inside the payload are left alone.
#[must_use]
pub fn strip_json_fences(text: &str) -> String {
    let opened = OPENING_FENCE.replace(text, "");
    CLOSING_FENCE.replace(&opened, "").trim().to_string()
}

/// Returns at most `max_chars` characters of `text`.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parses a model response into a JSON value.
///
/// # Errors
///
/// Returns [`ArticleflowError::EmptyPayload`] if nothing remains after
/// stripping fences, and [`ArticleflowError::MalformedPayload`] carrying a
/// bounded preview if the text is not valid JSON.
pub fn parse_structured(text: &str, stage: &str) -> Result<serde_json::Value, ArticleflowError> {
    let cleaned = strip_json_fences(text);
    if cleaned.is_empty() {
        return Err(ArticleflowError::EmptyPayload {
            stage: stage.to_string(),
        });
    }

    serde_json::from_str(&cleaned).map_err(|e| ArticleflowError::MalformedPayload {
        stage: stage.to_string(),
        reason: e.to_string(),
        preview: preview(&cleaned, PREVIEW_CHARS).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_fenced_json() {
        let value = parse_structured("```json\n{\"a\":1}\n```", "Stage 1").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_parse_untagged_fence_and_whitespace() {
        let value = parse_structured("  \n```\n[1, 2]\n```  \n", "Stage 1").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_inner_fences_survive() {
        let snippet = "use ```rust\nfn main() {}\n``` blocks";
        let raw = fixtures::fenced(&json!({"snippet": snippet}));

        let value = parse_structured(&raw, "Stage 3").unwrap();
        assert_eq!(value, json!({"snippet": snippet}));

        let compact = format!("```json\n{}\n```", json!({"snippet": snippet}));
        assert_eq!(parse_structured(&compact, "Stage 3").unwrap()["snippet"], snippet);
    }

    #[test]
    fn test_single_line_fence() {
        let value = parse_structured("```json{\"a\": [1]}```", "Stage 1").unwrap();
        assert_eq!(value, json!({"a": [1]}));
    }

    #[test]
    fn test_parse_plain_json() {
        let value = parse_structured("{\"ok\": true}", "Stage 2").unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_only_fences_is_empty_payload() {
        let err = parse_structured("```json\n\n```", "Stage 3").unwrap_err();
        assert!(matches!(err, ArticleflowError::EmptyPayload { ref stage } if stage == "Stage 3"));
    }

    #[test]
    fn test_malformed_payload_has_bounded_preview() {
        let long = format!("{{\"a\": \"{}", "x".repeat(2000));
        let err = parse_structured(&long, "Stage 2").unwrap_err();

        match err {
            ArticleflowError::MalformedPayload { stage, preview, .. } => {
                assert_eq!(stage, "Stage 2");
                assert_eq!(preview.chars().count(), PREVIEW_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_comma_is_not_repaired() {
        let err = parse_structured("{\"a\": 1,}", "Stage 1").unwrap_err();
        assert_eq!(err.code(), crate::errors::codes::MALFORMED_PAYLOAD);
        assert!(err.to_string().starts_with("Failed to process Stage 1:"));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "ăîșțâ".repeat(10);
        assert_eq!(preview(&text, 3), "ăîș");
        assert_eq!(preview("short", 500), "short");
    }
}
