//! Stage response validation.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::schema::{
    check_object, FieldRule, OUTLINE_RULES, REFERENCES_RULES, RESEARCH_RULES, SCORING_RULES,
};
use crate::errors::ArticleflowError;
use crate::stages::{OutlineResult, ReferencesResult, ResearchResult, SeoReport, StageTag};

/// A stage result type with a JSON schema.
pub trait StageSchema: DeserializeOwned {
    /// The stage this result belongs to.
    const STAGE: StageTag;

    /// Field rules checked before deserialization.
    fn rules() -> &'static [FieldRule];
}

impl StageSchema for ResearchResult {
    const STAGE: StageTag = StageTag::Research;

    fn rules() -> &'static [FieldRule] {
        RESEARCH_RULES
    }
}

impl StageSchema for OutlineResult {
    const STAGE: StageTag = StageTag::Outline;

    fn rules() -> &'static [FieldRule] {
        OUTLINE_RULES
    }
}

impl StageSchema for ReferencesResult {
    const STAGE: StageTag = StageTag::References;

    fn rules() -> &'static [FieldRule] {
        REFERENCES_RULES
    }
}

impl StageSchema for SeoReport {
    const STAGE: StageTag = StageTag::Scoring;

    fn rules() -> &'static [FieldRule] {
        SCORING_RULES
    }
}

/// Validates a parsed payload as the result of stage `T::STAGE`.
///
/// Unknown fields pass through. Missing or mistyped fields fail with a
/// [`ArticleflowError::SchemaViolation`] listing every violation.
pub fn validate<T: StageSchema>(value: Value) -> Result<T, ArticleflowError> {
    let stage = T::STAGE.label();
    let mut violations = Vec::new();
    check_object(&value, T::rules(), "", &mut violations);

    if !violations.is_empty() {
        let violations: Vec<String> = violations.iter().map(ToString::to_string).collect();
        warn!(stage, violations = ?violations, "Stage response failed validation");
        return Err(ArticleflowError::schema_violation(stage, violations));
    }

    serde_json::from_value(value).map_err(|e| {
        warn!(stage, error = %e, "Stage response failed validation");
        ArticleflowError::schema_violation(stage, vec![e.to_string()])
    })
}

/// A validated structured stage result.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// Stage 1.
    Research(ResearchResult),
    /// Stage 2.
    Outline(OutlineResult),
    /// Stage 3.
    References(ReferencesResult),
    /// Stage 5.
    Scoring(SeoReport),
}

impl StageOutput {
    /// Returns the stage that produced this output.
    #[must_use]
    pub fn stage(&self) -> StageTag {
        match self {
            Self::Research(_) => StageTag::Research,
            Self::Outline(_) => StageTag::Outline,
            Self::References(_) => StageTag::References,
            Self::Scoring(_) => StageTag::Scoring,
        }
    }
}

/// Validates a parsed payload against the schema of `stage`.
///
/// Stage 4 produces HTML rather than JSON and has no schema.
pub fn validate_stage(value: Value, stage: StageTag) -> Result<StageOutput, ArticleflowError> {
    match stage {
        StageTag::Research => validate(value).map(StageOutput::Research),
        StageTag::Outline => validate(value).map(StageOutput::Outline),
        StageTag::References => validate(value).map(StageOutput::References),
        StageTag::Scoring => validate(value).map(StageOutput::Scoring),
        StageTag::Assembly => Err(ArticleflowError::schema_violation(
            stage.label(),
            vec![format!("{stage} produces HTML and has no JSON schema")],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_validate_research() {
        let result: ResearchResult = validate(fixtures::research_value()).unwrap();
        assert_eq!(result.primary_keyword, "workplace anxiety");
        assert_eq!(result.secondary_keywords.len(), 3);
    }

    #[test]
    fn test_outline_missing_title_names_field() {
        let mut value = fixtures::outline_value();
        value.as_object_mut().unwrap().remove("proposed_title");

        let err = validate::<OutlineResult>(value).unwrap_err();
        match &err {
            ArticleflowError::SchemaViolation { stage, violations } => {
                assert_eq!(stage, "Stage 2");
                assert_eq!(violations, &vec!["\"proposed_title\" is required".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("proposed_title"));
    }

    #[test]
    fn test_outline_extra_field_passes_through() {
        let mut value = fixtures::outline_value();
        value["reading_time"] = json!("6 min");

        let result: OutlineResult = validate(value).unwrap();
        assert_eq!(result.extra.get("reading_time"), Some(&json!("6 min")));
    }

    #[test]
    fn test_every_violation_is_reported() {
        let err = validate::<ReferencesResult>(json!({
            "author_insights": [{"author": "Viktor Frankl"}],
            "external_sources": [1]
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid response in Stage 3: \"author_insights[0].concept\" is required; \
             \"author_insights[0].quote_or_idea\" is required; \
             \"external_sources[0]\" must be a string"
        );
    }

    #[test]
    fn test_scoring_clamps_out_of_range() {
        let mut value = fixtures::scoring_value();
        value["overall_score"] = json!(130);
        let report: SeoReport = validate(value).unwrap();
        assert_eq!(report.overall_score, 100);

        let mut value = fixtures::scoring_value();
        value["overall_score"] = json!(-12.5);
        let report: SeoReport = validate(value).unwrap();
        assert_eq!(report.overall_score, 0);
    }

    #[test]
    fn test_scoring_rejects_non_numeric_score() {
        let mut value = fixtures::scoring_value();
        value["overall_score"] = json!("85");
        let err = validate::<SeoReport>(value).unwrap_err();
        assert_eq!(err.stage(), Some("Stage 5"));
        assert!(err.to_string().contains("overall_score"));
    }

    #[test]
    fn test_validate_stage_dispatch() {
        let output = validate_stage(fixtures::references_value(), StageTag::References).unwrap();
        assert_eq!(output.stage(), StageTag::References);

        let err = validate_stage(json!({}), StageTag::Assembly).unwrap_err();
        assert_eq!(err.stage(), Some("Stage 4"));
    }
}
