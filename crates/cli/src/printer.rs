//! Console rendering of session progress.
//!
//! Pretty mode writes dim lines to stderr so piped stdout stays clean;
//! JSON mode writes one object per event to stdout for scripting.

use hm_domain::capability::ToolOutcome;
use hm_session::{truncate_str, SessionObserver};

const PREVIEW_CHARS: usize = 200;

pub struct ConsoleObserver {
    json: bool,
}

impl ConsoleObserver {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn line(&self, kind: &str, fields: serde_json::Value) {
        if self.json {
            let mut record = serde_json::Map::new();
            record.insert("event".into(), kind.into());
            if let serde_json::Value::Object(extra) = fields {
                record.extend(extra);
            }
            println!("{}", serde_json::Value::Object(record));
        } else if let Some(text) = fields.get("text").and_then(|v| v.as_str()) {
            eprintln!("\x1b[2m[{kind}] {text}\x1b[0m");
        } else {
            eprintln!("\x1b[2m[{kind}]\x1b[0m");
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_progress(&self, message: &str) {
        self.line("progress", serde_json::json!({ "text": message, "message": message }));
    }

    fn on_reflection(&self, assessment: &str, reasoning: &str) {
        self.line(
            "reflection",
            serde_json::json!({
                "text": assessment,
                "assessment": assessment,
                "reasoning": reasoning,
            }),
        );
    }

    fn on_command_selected(&self, command: &str) {
        self.line(
            "command",
            serde_json::json!({ "text": command, "command": command }),
        );
    }

    fn on_command_output(&self, command: &str, output: &str, error: Option<&str>) {
        let text = match error {
            Some(e) => format!("{command} failed: {}", truncate_str(e, PREVIEW_CHARS)),
            None => format!("{command}: {}", truncate_str(output, PREVIEW_CHARS)),
        };
        self.line(
            "command_output",
            serde_json::json!({
                "text": text,
                "command": command,
                "output": output,
                "error": error,
            }),
        );
    }

    fn on_tool_call(&self, tool: &str, args: &serde_json::Value) {
        self.line(
            "tool_call",
            serde_json::json!({ "text": tool, "tool": tool, "args": args }),
        );
    }

    fn on_tool_result(&self, outcome: &ToolOutcome) {
        let text = match &outcome.error {
            Some(e) => format!("{} failed: {}", outcome.tool, truncate_str(e, PREVIEW_CHARS)),
            None => format!("{} ok", outcome.tool),
        };
        self.line(
            "tool_result",
            serde_json::json!({
                "text": text,
                "tool": outcome.tool,
                "output": outcome.output,
                "error": outcome.error,
            }),
        );
    }

    fn on_plan_created(&self, plan: &str, total_steps: u32) {
        self.line(
            "plan",
            serde_json::json!({
                "text": format!("{total_steps} steps: {}", truncate_str(plan, PREVIEW_CHARS)),
                "plan": plan,
                "total_steps": total_steps,
            }),
        );
    }

    fn on_step_completed(&self, step: u32, summary: &str) {
        self.line(
            "step_completed",
            serde_json::json!({
                "text": format!("step {step}: {}", truncate_str(summary, PREVIEW_CHARS)),
                "step": step,
                "summary": summary,
            }),
        );
    }

    fn on_step_failed(&self, step: u32, error: &str) {
        self.line(
            "step_failed",
            serde_json::json!({
                "text": format!("step {step} failed: {}", truncate_str(error, PREVIEW_CHARS)),
                "step": step,
                "error": error,
            }),
        );
    }

    fn on_plan_complete(&self, total_steps: u32) {
        self.line(
            "plan_complete",
            serde_json::json!({
                "text": format!("all {total_steps} steps complete"),
                "total_steps": total_steps,
            }),
        );
    }
}
