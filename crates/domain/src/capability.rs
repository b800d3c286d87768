use serde::{Deserialize, Serialize};

/// A named, externally invocable action the backend may request.
///
/// Supplied by the caller at session start and immutable for the session's
/// duration.  The argument schema is opaque to the orchestrator — it is
/// forwarded to the backend and never validated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    /// Unique within the catalog; lookup is exact-name match.
    pub name: String,
    /// Reference to the execution target (interpreted by the executor).
    pub target: String,
    /// JSON Schema for the capability's arguments, opaque here.
    pub schema: serde_json::Value,
}

impl Capability {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            schema,
        }
    }
}

/// The result of dispatching one tool invocation.
///
/// Dispatch never fails at the type level: absence from the catalog and
/// executor failures both come back as an outcome with `error` populated, so
/// the session loop can fold them into the next round instead of aborting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutcome {
    pub tool: String,
    /// Serialized result payload.  May be empty on success-with-no-output.
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(tool: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            output: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_has_empty_output() {
        let outcome = ToolOutcome::failed("k8s_get_pods", "tool 'k8s_get_pods' not found");
        assert!(outcome.is_error());
        assert!(outcome.output.is_empty());
    }

    #[test]
    fn ok_outcome_serializes_without_error_field() {
        let outcome = ToolOutcome::ok("k8s_get_pods", r#"{"pods":[]}"#);
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("error"));
    }
}
