//! The assembled output of a successful article run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::stages::{
    AuthorInsight, OutlineResult, OutlineSection, ReferencesResult, ResearchResult, SeoReport,
};

/// Provenance and meta proposal of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    /// The content gap the article exploits.
    pub unique_angle: String,
    /// Proposed meta title.
    pub proposed_title: String,
    /// Proposed meta description.
    pub proposed_description: String,
    /// When the artifact was assembled.
    pub generated_at: DateTime<Utc>,
    /// Opaque identifier of the caller.
    pub requester_id: String,
    /// Identifier of the pipeline run.
    pub run_id: Uuid,
}

/// A complete generated article with everything the stages produced.
///
/// Built once at the end of a run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleArtifact {
    /// Renderable body fragment of the article.
    pub article_html: String,
    /// The refined subject.
    pub final_subject: String,
    /// Primary, secondary, and long-tail keywords joined with ", ".
    pub keywords: String,
    /// Section outline.
    pub outline: Vec<OutlineSection>,
    /// Expert concepts used in the article.
    pub author_insights: Vec<AuthorInsight>,
    /// Statistic themes.
    pub statistic_ideas: Vec<String>,
    /// Suggested external sources.
    pub external_sources: Vec<String>,
    /// SEO report, or the fallback report if scoring failed.
    pub seo_analysis: SeoReport,
    /// Provenance and meta proposal.
    pub metadata: ArtifactMetadata,
}

impl ArticleArtifact {
    /// Assembles the artifact from the validated stage results.
    #[must_use]
    pub fn assemble(
        research: ResearchResult,
        outline: OutlineResult,
        references: ReferencesResult,
        article_html: String,
        seo_analysis: SeoReport,
        requester_id: impl Into<String>,
        run_id: Uuid,
    ) -> Self {
        let keywords = research.keyword_string();
        Self {
            article_html,
            final_subject: research.final_subject,
            keywords,
            outline: outline.outline,
            author_insights: references.author_insights,
            statistic_ideas: references.statistic_ideas,
            external_sources: references.external_sources,
            seo_analysis,
            metadata: ArtifactMetadata {
                unique_angle: outline.unique_angle,
                proposed_title: outline.proposed_title,
                proposed_description: outline.proposed_description,
                generated_at: Utc::now(),
                requester_id: requester_id.into(),
                run_id,
            },
        }
    }

    /// Returns true if SEO scoring fell back to the fixed report.
    #[must_use]
    pub fn seo_fell_back(&self) -> bool {
        self.seo_analysis.is_fallback()
    }

    /// Converts the artifact to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }
}
