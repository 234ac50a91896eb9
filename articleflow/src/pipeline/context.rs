//! Per-run identity threaded through every stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifies one pipeline run and its requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Unique ID of this run.
    pub run_id: Uuid,
    /// Opaque identifier of the caller.
    pub requester_id: String,
}

impl RunContext {
    /// Creates a run context with a fresh run ID.
    #[must_use]
    pub fn new(requester_id: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            requester_id: requester_id.into(),
        }
    }

    /// Creates a run context with a specific run ID.
    #[must_use]
    pub fn with_run_id(requester_id: impl Into<String>, run_id: Uuid) -> Self {
        Self {
            run_id,
            requester_id: requester_id.into(),
        }
    }

    /// Builds an event payload for `stage`, merged with the fields of `extra`.
    #[must_use]
    pub fn event_payload(&self, stage: &str, extra: Value) -> Value {
        let mut payload = serde_json::Map::new();
        payload.insert("stage".to_string(), Value::from(stage));
        payload.insert("requester_id".to_string(), Value::from(self.requester_id.as_str()));
        payload.insert("run_id".to_string(), Value::from(self.run_id.to_string()));
        if let Value::Object(fields) = extra {
            payload.extend(fields);
        }
        Value::Object(payload)
    }
}
