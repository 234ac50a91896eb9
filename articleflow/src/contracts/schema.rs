//! Declarative field rules for stage payloads.
//!
//! Rules are checked against the raw JSON before deserialization so every
//! violation can be reported at once instead of stopping at the first.

use serde_json::Value;
use std::fmt;

/// Expected JSON shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string.
    Text,
    /// Any JSON number.
    Number,
    /// Any JSON object.
    Object,
    /// Object whose values are all objects.
    ObjectMap,
    /// Array of strings.
    TextList,
    /// Array of objects matching nested rules.
    ObjectList(&'static [FieldRule]),
}

/// A rule for one named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name in the wire format.
    pub name: &'static str,
    /// Expected shape.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
}

impl FieldRule {
    /// A field that must be present.
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    /// A field that may be absent.
    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error message.
    pub message: String,
    /// Path of the offending field, if applicable.
    pub field: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(ref field) => write!(f, "\"{}\" {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Checks `value` against `rules`, appending every violation found.
///
/// Fields not named by a rule are ignored.
pub fn check_object(
    value: &Value,
    rules: &[FieldRule],
    path: &str,
    violations: &mut Vec<ValidationError>,
) {
    let Some(object) = value.as_object() else {
        if path.is_empty() {
            violations.push(ValidationError::new("payload must be an object"));
        } else {
            violations.push(ValidationError::for_field(path, "must be an object"));
        }
        return;
    };

    for rule in rules {
        let field_path = join_path(path, rule.name);
        match object.get(rule.name) {
            None if rule.required => {
                violations.push(ValidationError::for_field(field_path, "is required"));
            }
            None => {}
            Some(field) => check_kind(field, rule.kind, &field_path, violations),
        }
    }
}

fn check_kind(value: &Value, kind: FieldKind, path: &str, violations: &mut Vec<ValidationError>) {
    match kind {
        FieldKind::Text => match value.as_str() {
            Some(s) if s.trim().is_empty() => {
                violations.push(ValidationError::for_field(path, "is not allowed to be empty"));
            }
            Some(_) => {}
            None => violations.push(ValidationError::for_field(path, "must be a string")),
        },
        FieldKind::Number => {
            if !value.is_number() {
                violations.push(ValidationError::for_field(path, "must be a number"));
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                violations.push(ValidationError::for_field(path, "must be an object"));
            }
        }
        FieldKind::ObjectMap => match value.as_object() {
            Some(map) => {
                for (key, entry) in map {
                    if !entry.is_object() {
                        violations.push(ValidationError::for_field(
                            join_path(path, key),
                            "must be an object",
                        ));
                    }
                }
            }
            None => violations.push(ValidationError::for_field(path, "must be an object")),
        },
        FieldKind::TextList => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        violations.push(ValidationError::for_field(
                            format!("{path}[{i}]"),
                            "must be a string",
                        ));
                    }
                }
            }
            None => violations.push(ValidationError::for_field(path, "must be an array")),
        },
        FieldKind::ObjectList(rules) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_object(item, rules, &format!("{path}[{i}]"), violations);
                }
            }
            None => violations.push(ValidationError::for_field(path, "must be an array")),
        },
    }
}

/// Stage 1 fields.
pub const RESEARCH_RULES: &[FieldRule] = &[
    FieldRule::required("final_subject", FieldKind::Text),
    FieldRule::required("primary_keyword", FieldKind::Text),
    FieldRule::required("secondary_keywords", FieldKind::TextList),
    FieldRule::required("long_tail_keywords", FieldKind::TextList),
    FieldRule::optional("rationale", FieldKind::Text),
];

const OUTLINE_SECTION_RULES: &[FieldRule] = &[
    FieldRule::required("heading", FieldKind::Text),
    FieldRule::optional("subheadings", FieldKind::TextList),
];

/// Stage 2 fields.
pub const OUTLINE_RULES: &[FieldRule] = &[
    FieldRule::required("outline", FieldKind::ObjectList(OUTLINE_SECTION_RULES)),
    FieldRule::required("unique_angle", FieldKind::Text),
    FieldRule::required("proposed_title", FieldKind::Text),
    FieldRule::required("proposed_description", FieldKind::Text),
];

const AUTHOR_INSIGHT_RULES: &[FieldRule] = &[
    FieldRule::required("author", FieldKind::Text),
    FieldRule::required("concept", FieldKind::Text),
    FieldRule::required("quote_or_idea", FieldKind::Text),
];

/// Stage 3 fields.
pub const REFERENCES_RULES: &[FieldRule] = &[
    FieldRule::required("author_insights", FieldKind::ObjectList(AUTHOR_INSIGHT_RULES)),
    FieldRule::optional("statistic_ideas", FieldKind::TextList),
    FieldRule::optional("external_sources", FieldKind::TextList),
];

/// Stage 5 fields.
pub const SCORING_RULES: &[FieldRule] = &[
    FieldRule::required("overall_score", FieldKind::Number),
    FieldRule::required("detailed_analysis", FieldKind::ObjectMap),
    FieldRule::required("priority_recommendations", FieldKind::TextList),
    FieldRule::required("seo_status", FieldKind::Text),
];
