use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;

/// A boxed async stream, used for the backend's streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// The stream of decoded events produced by one round.
pub type EventStream = BoxStream<'static, Result<AgentEvent>>;

/// Events emitted by the agent server during a round.
///
/// The wire format tags each record with a `type` string; this enum closes
/// that grammar so new kinds are compile-checked at every match site.  A
/// record whose tag is not listed here fails to deserialize and is treated
/// as decode noise by the decoder.
///
/// Exactly one of `Done`, `Error`, or a `ToolCallRequest`-driven
/// continuation terminates each round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AgentEvent {
    /// Free-form progress text for the UI.
    #[serde(rename = "progress")]
    Progress { message: String },

    /// The agent's self-assessment of the last step.
    #[serde(rename = "reflection")]
    Reflection { assessment: String, reasoning: String },

    /// The agent picked a cluster command to run.
    #[serde(rename = "command_selected")]
    CommandSelected { command: String },

    /// Output of a command the backend ran itself.  An `error` tags the
    /// output as failed but is not fatal to the round.
    #[serde(rename = "command_output")]
    CommandOutput {
        command: String,
        output: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// The backend requests a tool invocation.  `history` is the opaque
    /// conversation token that must be sent back verbatim on the next round.
    #[serde(rename = "tool_call_request")]
    ToolCallRequest {
        tool: String,
        #[serde(default)]
        args: serde_json::Value,
        history: serde_json::Value,
    },

    /// The agent produced a multi-step plan.
    #[serde(rename = "plan_created")]
    PlanCreated { plan: String, total_steps: u32 },

    #[serde(rename = "step_completed")]
    StepCompleted { step: u32, summary: String },

    #[serde(rename = "step_failed")]
    StepFailed { step: u32, error: String },

    #[serde(rename = "plan_complete")]
    PlanComplete { total_steps: u32 },

    /// Terminal: the session is complete.
    #[serde(rename = "done")]
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        final_response: Option<String>,
    },

    /// Terminal: the backend reported a semantic failure.  Never dropped
    /// as noise — the message propagates verbatim.
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
    },
}

impl AgentEvent {
    /// True for `Done` and `Error` — the events that end a round without
    /// a continuation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::Done { .. } | AgentEvent::Error { .. })
    }
}
