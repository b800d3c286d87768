//! Observer seam for incremental session output.
//!
//! The driver forwards informational events to the observer as they arrive,
//! one callback per event kind, so UIs can render progress without waiting
//! for the session to finish.  All methods default to no-ops; implement
//! only what the surface needs.

use hm_domain::capability::ToolOutcome;

pub trait SessionObserver: Send + Sync {
    fn on_progress(&self, _message: &str) {}
    fn on_reflection(&self, _assessment: &str, _reasoning: &str) {}
    fn on_command_selected(&self, _command: &str) {}
    fn on_command_output(&self, _command: &str, _output: &str, _error: Option<&str>) {}
    fn on_tool_call(&self, _tool: &str, _args: &serde_json::Value) {}
    fn on_tool_result(&self, _outcome: &ToolOutcome) {}
    fn on_plan_created(&self, _plan: &str, _total_steps: u32) {}
    fn on_step_completed(&self, _step: u32, _summary: &str) {}
    fn on_step_failed(&self, _step: u32, _error: &str) {}
    fn on_plan_complete(&self, _total_steps: u32) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// Shorten a string for display previews and log fields.
///
/// Display-only: the payload threaded into the next round is never
/// truncated.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}
