//! HTML post-processing for generated articles.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```(?:html)?[ \t]*\r?\n?").expect("valid fence pattern"));

#[allow(clippy::expect_used)]
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?```\s*$").expect("valid fence pattern"));

#[allow(clippy::expect_used)]
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid body selector"));

#[allow(clippy::expect_used)]
static SECTION_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("valid heading selector"));

/// Removes the outer html code-fence markers and surrounding whitespace.
#[must_use]
pub fn strip_html_fences(text: &str) -> String {
    let opened = OPENING_FENCE.replace(text, "");
    CLOSING_FENCE.replace(&opened, "").trim().to_string()
}

/// Returns the renderable body fragment of a model's HTML output.
///
/// Fences are stripped and the text is parsed as a full document; the
/// serialized contents of `<body>` are returned. Text with no document
/// wrapper ends up in the body unchanged. Never fails.
#[must_use]
pub fn clean_html_response(text: &str) -> String {
    let cleaned = strip_html_fences(text);
    let document = Html::parse_document(&cleaned);

    document
        .select(&BODY)
        .next()
        .map_or_else(|| cleaned.clone(), |body| body.inner_html().trim().to_string())
}

/// Returns the text of every `<h2>` heading in document order.
#[must_use]
pub fn extract_section_titles(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&SECTION_HEADING)
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}
