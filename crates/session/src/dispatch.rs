//! Tool dispatcher — resolves a backend-requested tool name against the
//! session's capability catalog and delegates invocation to the executor.
//!
//! Dispatch always produces a recoverable [`ToolOutcome`], never an `Err`:
//! an unknown name and an execution failure both fold into the next round
//! so the agent can react, instead of aborting the session.

use hm_domain::capability::{Capability, ToolOutcome};
use hm_domain::error::Result;

use crate::observer::truncate_str;

/// Seam to the capability-execution collaborator.
///
/// Execution itself (running a cluster command, calling an API) lives
/// outside this subsystem; the dispatcher only owns the contract.
#[async_trait::async_trait]
pub trait CapabilityExecutor: Send + Sync {
    async fn invoke(&self, capability: &Capability, args: &serde_json::Value)
        -> Result<serde_json::Value>;
}

/// Dispatch one tool invocation.
///
/// Lookup is exact-name match against the read-only catalog.  On a match,
/// the executor's success payload is serialized deterministically (string
/// payloads pass through as-is); its failure message becomes the outcome
/// error.  Stateless per call.
pub async fn dispatch(
    tool: &str,
    args: &serde_json::Value,
    catalog: &[Capability],
    executor: &dyn CapabilityExecutor,
) -> ToolOutcome {
    let Some(capability) = catalog.iter().find(|c| c.name == tool) else {
        tracing::warn!(tool, "requested tool not in catalog");
        return ToolOutcome::failed(tool, format!("tool '{tool}' not found"));
    };

    match executor.invoke(capability, args).await {
        Ok(value) => {
            let output = match value {
                serde_json::Value::String(s) => s,
                other => match serde_json::to_string(&other) {
                    Ok(s) => s,
                    Err(e) => return ToolOutcome::failed(tool, format!("unserializable result: {e}")),
                },
            };
            tracing::debug!(tool, preview = %truncate_str(&output, 200), "tool succeeded");
            ToolOutcome::ok(tool, output)
        }
        Err(e) => {
            tracing::warn!(tool, error = %e, "tool execution failed");
            ToolOutcome::failed(tool, e.to_string())
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use hm_domain::error::Error;

    struct FixedExecutor(std::result::Result<serde_json::Value, String>);

    #[async_trait::async_trait]
    impl CapabilityExecutor for FixedExecutor {
        async fn invoke(
            &self,
            _capability: &Capability,
            _args: &serde_json::Value,
        ) -> Result<serde_json::Value> {
            self.0.clone().map_err(Error::Config)
        }
    }

    fn catalog() -> Vec<Capability> {
        vec![Capability::new(
            "k8s_get_pods",
            "kubectl",
            serde_json::json!({"type": "object"}),
        )]
    }

    #[tokio::test]
    async fn unknown_tool_yields_recoverable_not_found_outcome() {
        let executor = FixedExecutor(Ok(serde_json::json!({})));
        let outcome = dispatch("k8s_scale", &serde_json::json!({}), &catalog(), &executor).await;
        assert_eq!(outcome.error.as_deref(), Some("tool 'k8s_scale' not found"));
        assert!(outcome.output.is_empty());
    }

    #[tokio::test]
    async fn success_payload_is_serialized() {
        let executor = FixedExecutor(Ok(serde_json::json!({"pods": []})));
        let outcome = dispatch("k8s_get_pods", &serde_json::json!({}), &catalog(), &executor).await;
        assert!(!outcome.is_error());
        assert_eq!(outcome.output, r#"{"pods":[]}"#);
    }

    #[tokio::test]
    async fn string_payload_passes_through_unquoted() {
        let executor = FixedExecutor(Ok(serde_json::Value::String("NAME READY".into())));
        let outcome = dispatch("k8s_get_pods", &serde_json::json!({}), &catalog(), &executor).await;
        assert_eq!(outcome.output, "NAME READY");
    }

    #[tokio::test]
    async fn executor_failure_folds_into_outcome() {
        let executor = FixedExecutor(Err("kubeconfig missing".into()));
        let outcome = dispatch("k8s_get_pods", &serde_json::json!({}), &catalog(), &executor).await;
        assert_eq!(outcome.error.as_deref(), Some("config: kubeconfig missing"));
        assert!(outcome.output.is_empty());
    }

    #[tokio::test]
    async fn empty_success_output_is_not_an_error() {
        let executor = FixedExecutor(Ok(serde_json::Value::String(String::new())));
        let outcome = dispatch("k8s_get_pods", &serde_json::json!({}), &catalog(), &executor).await;
        assert!(!outcome.is_error());
        assert!(outcome.output.is_empty());
    }

    #[tokio::test]
    async fn full_payload_is_never_truncated() {
        let big = "p".repeat(10_000);
        let executor = FixedExecutor(Ok(serde_json::Value::String(big.clone())));
        let outcome = dispatch("k8s_get_pods", &serde_json::json!({}), &catalog(), &executor).await;
        // Truncation is display-only; the threaded payload stays whole.
        assert_eq!(outcome.output, big);
    }
}
