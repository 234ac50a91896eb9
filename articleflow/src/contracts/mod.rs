//! Stage output contracts.
//!
//! Each structured stage has a declarative field schema. Validation checks
//! the parsed JSON against it, collects every violation, then deserializes
//! into the typed stage result.

mod schema;
mod validator;

pub use schema::{
    check_object, FieldKind, FieldRule, ValidationError, OUTLINE_RULES, REFERENCES_RULES,
    RESEARCH_RULES, SCORING_RULES,
};
pub use validator::{validate, validate_stage, StageOutput, StageSchema};
