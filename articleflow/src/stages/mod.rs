//! Pipeline stages and their validated results.
//!
//! An article run is five strictly ordered stages. Each stage's validated
//! result is the only input (besides the subject) to the next stage.

mod results;

pub use results::{
    clamp_score, AuthorInsight, CategoryAnalysis, OutlineResult, OutlineSection, ReferencesResult,
    ResearchResult, SeoReport, FALLBACK_SCORE, FALLBACK_STATUS,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log label for the summarize operation.
pub const SUMMARIZE_LABEL: &str = "Summarize Article";

/// Log label for the expand operation.
pub const EXPAND_LABEL: &str = "Expand Section";

/// The five article pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageTag {
    /// Keyword research.
    Research,
    /// Outline and meta proposal.
    Outline,
    /// Expert references.
    References,
    /// HTML assembly.
    Assembly,
    /// SEO scoring.
    Scoring,
}

impl StageTag {
    /// All stages in execution order.
    pub const ALL: [Self; 5] = [
        Self::Research,
        Self::Outline,
        Self::References,
        Self::Assembly,
        Self::Scoring,
    ];

    /// Returns the 1-based stage number.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Research => 1,
            Self::Outline => 2,
            Self::References => 3,
            Self::Assembly => 4,
            Self::Scoring => 5,
        }
    }

    /// Returns the stage for a 1-based number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    /// Returns the label used in logs and error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Research => "Stage 1",
            Self::Outline => "Stage 2",
            Self::References => "Stage 3",
            Self::Assembly => "Stage 4",
            Self::Scoring => "Stage 5",
        }
    }

    /// Returns a short descriptive name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Outline => "outline",
            Self::References => "references",
            Self::Assembly => "assembly",
            Self::Scoring => "scoring",
        }
    }

    /// Returns true if the stage's output is JSON validated against a schema.
    #[must_use]
    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Assembly)
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
