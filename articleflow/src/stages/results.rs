//! Validated stage results.
//!
//! Results deserialize from the model's snake_case JSON and serialize in
//! camelCase for the outbound artifact. Unknown fields are kept in `extra`
//! and passed through.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Score substituted when SEO scoring fails.
pub const FALLBACK_SCORE: u8 = 75;

/// Status substituted when SEO scoring fails.
pub const FALLBACK_STATUS: &str = "Parțial analizat";

type Extra = serde_json::Map<String, serde_json::Value>;

/// Stage 1: chosen subject and keyword set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct ResearchResult {
    /// The refined subject the article is written about.
    pub final_subject: String,
    /// Primary keyword.
    pub primary_keyword: String,
    /// Secondary (LSI) keywords.
    pub secondary_keywords: Vec<String>,
    /// Long-tail keywords.
    pub long_tail_keywords: Vec<String>,
    /// Why this subject and keyword set was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

impl ResearchResult {
    /// Returns the primary, secondary, and long-tail keywords joined with
    /// ", ", in that order, skipping empty entries.
    #[must_use]
    pub fn keyword_string(&self) -> String {
        std::iter::once(&self.primary_keyword)
            .chain(&self.secondary_keywords)
            .chain(&self.long_tail_keywords)
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One `<h2>` section of the proposed outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct OutlineSection {
    /// Section heading.
    pub heading: String,
    /// Sub-section headings.
    #[serde(default)]
    pub subheadings: Vec<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Stage 2: outline and meta proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct OutlineResult {
    /// Ordered sections.
    pub outline: Vec<OutlineSection>,
    /// The content gap the article exploits.
    pub unique_angle: String,
    /// Proposed meta title.
    pub proposed_title: String,
    /// Proposed meta description.
    pub proposed_description: String,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A concept from a recognized author, with a quote or core idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct AuthorInsight {
    /// Author name.
    pub author: String,
    /// Concept name.
    pub concept: String,
    /// Representative quote or idea.
    pub quote_or_idea: String,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Stage 3: expert references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct ReferencesResult {
    /// Author insights.
    pub author_insights: Vec<AuthorInsight>,
    /// Statistic themes, without figures.
    #[serde(default)]
    pub statistic_ideas: Vec<String>,
    /// Suggested authoritative sources.
    #[serde(default)]
    pub external_sources: Vec<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Score and comments for one analysis category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct CategoryAnalysis {
    /// Category score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Reviewer comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Stage 5: SEO report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct SeoReport {
    /// Overall score, always within 0..=100.
    #[serde(deserialize_with = "deserialize_score")]
    pub overall_score: u8,
    /// Per-category analysis.
    pub detailed_analysis: BTreeMap<String, CategoryAnalysis>,
    /// Most important improvements.
    pub priority_recommendations: Vec<String>,
    /// Overall status label.
    pub seo_status: String,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

impl SeoReport {
    /// Returns the report substituted when scoring fails.
    #[must_use]
    pub fn fallback() -> Self {
        let mut detailed_analysis = BTreeMap::new();
        detailed_analysis.insert(
            "report".to_string(),
            CategoryAnalysis {
                comments: Some(
                    "SEO report could not be fully generated, but the article was created successfully."
                        .to_string(),
                ),
                ..CategoryAnalysis::default()
            },
        );

        Self {
            overall_score: FALLBACK_SCORE,
            detailed_analysis,
            priority_recommendations: vec![
                "Check keyword density manually".to_string(),
                "Make sure the H1-H3 structure is correct".to_string(),
                "Review the meta description and title".to_string(),
                "Verify the generated external links".to_string(),
            ],
            seo_status: FALLBACK_STATUS.to_string(),
            extra: Extra::new(),
        }
    }

    /// Returns true if this is the fallback report.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.overall_score == FALLBACK_SCORE && self.seo_status == FALLBACK_STATUS
    }
}

/// Rounds a raw score and clamps it into 0..=100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_score)
}
