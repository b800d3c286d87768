//! Session driver — the core state machine that runs one query to
//! completion: preflight, the bounded round loop, history-token threading,
//! tool dispatch, and error classification.
//!
//! States: `Idle → Preflight → RoundActive → {RoundActive | Done | Failed |
//! Cancelled}`.  Rounds are strictly sequential; round N+1 never starts
//! before round N terminates.  Every suspension point (probe wait, stream
//! read, tool invocation) is raced against the cancellation token, and a
//! cancelled session resolves to [`SessionOutcome::Cancelled`] — never an
//! error.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use hm_backend::client::{AgentBackend, RoundRequest};
use hm_domain::capability::{Capability, ToolOutcome};
use hm_domain::chat::{ChatMessage, History};
use hm_domain::error::{Error, Result};
use hm_domain::event::AgentEvent;

use crate::dispatch::{dispatch, CapabilityExecutor};
use crate::observer::{truncate_str, NullObserver, SessionObserver};

/// Hard cap on rounds per session — the safety valve against runaway agent
/// loops.  Reaching it is a deliberate stop, not a bug path.
pub const MAX_ROUNDS: usize = 10;

/// Final response used when the backend signals `done` without one.
pub const NO_RESPONSE_FALLBACK: &str = "Agent completed without a final response.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / outcome types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything a session needs from the caller.  Immutable for the
/// session's duration.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// The user's goal text.
    pub query: String,
    /// Environment context (cluster, namespace, tooling summary).
    pub context: String,
    /// Prior conversation, replaced by the backend's token after the first
    /// tool round.
    pub history: Vec<ChatMessage>,
    /// The capability catalog, read-only and shared across dispatch calls.
    pub capabilities: Vec<Capability>,
    /// Provider selection forwarded to the backend.
    pub provider: String,
}

/// How a session resolved.  Cancellation is a first-class outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed {
        final_response: String,
        rounds_used: usize,
    },
    Cancelled,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-event transition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What one event does to the round.  Pure — the loop applies it — so
/// round-by-round behavior can be simulated deterministically in tests.
#[derive(Debug)]
enum Transition {
    /// Informational; forward to the observer, no state change.
    Notify(AgentEvent),
    /// Terminal for this round: dispatch the tool and continue.
    CallTool {
        tool: String,
        args: serde_json::Value,
        history: serde_json::Value,
    },
    /// Terminal for the session.
    Finish(Option<String>),
    Fail(String),
}

fn transition(event: AgentEvent) -> Transition {
    match event {
        AgentEvent::ToolCallRequest { tool, args, history } => {
            Transition::CallTool { tool, args, history }
        }
        AgentEvent::Done { final_response } => Transition::Finish(final_response),
        AgentEvent::Error { message } => Transition::Fail(message),
        other => Transition::Notify(other),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionDriver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One driver instance per query; instances share no mutable state.
pub struct SessionDriver {
    backend: Arc<dyn AgentBackend>,
    executor: Arc<dyn CapabilityExecutor>,
    observer: Arc<dyn SessionObserver>,
    max_rounds: usize,
}

impl SessionDriver {
    pub fn new(backend: Arc<dyn AgentBackend>, executor: Arc<dyn CapabilityExecutor>) -> Self {
        Self {
            backend,
            executor,
            observer: Arc::new(NullObserver),
            max_rounds: MAX_ROUNDS,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Run one query to completion.
    ///
    /// Issues at most `max_rounds` request/response cycles.  Returns
    /// `Ok(Completed)` on a `done` event (with the fixed fallback text when
    /// the backend sends none), `Ok(Cancelled)` when the token fires at any
    /// suspension point, and a classified error otherwise.
    pub async fn run(
        &self,
        request: SessionRequest,
        cancel: CancellationToken,
    ) -> Result<SessionOutcome> {
        let session_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("session", %session_id, query = %truncate_str(&request.query, 80));
        self.run_inner(request, cancel).instrument(span).await
    }

    async fn run_inner(
        &self,
        request: SessionRequest,
        cancel: CancellationToken,
    ) -> Result<SessionOutcome> {
        // ── Preflight ────────────────────────────────────────────────
        let ready = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
            ready = self.backend.ensure_running() => ready,
        };
        if !ready {
            return Err(Error::Unavailable);
        }

        let mut history = History::Messages(request.history.clone());
        let mut pending_tool: Option<ToolOutcome> = None;

        // ── Round loop ───────────────────────────────────────────────
        for round in 0..self.max_rounds {
            let payload = RoundRequest {
                query: request.query.clone(),
                context: request.context.clone(),
                provider: request.provider.clone(),
                tool_output: pending_tool.take(),
                history: history.clone(),
                capabilities: request.capabilities.clone(),
            };

            tracing::debug!(round, history_token = history.is_token(), "round start");
            let mut stream = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
                res = self.backend.send_round(&payload) => res?,
            };

            // Drive the stream to this round's terminal.  Dropping the
            // stream on exit closes the connection.
            let mut continuation = None;
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
                    ev = stream.next() => ev,
                };
                let Some(event) = next else {
                    break; // connection closed
                };

                match transition(event?) {
                    Transition::Notify(event) => self.forward(&event),
                    Transition::CallTool { tool, args, history } => {
                        continuation = Some((tool, args, history));
                        // Terminal exclusivity: anything after the tool
                        // request is ignored.
                        break;
                    }
                    Transition::Finish(response) => {
                        let final_response =
                            response.unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());
                        tracing::info!(rounds_used = round + 1, "session complete");
                        return Ok(SessionOutcome::Completed {
                            final_response,
                            rounds_used: round + 1,
                        });
                    }
                    Transition::Fail(message) => return Err(Error::Agent(message)),
                }
            }

            let Some((tool, args, token)) = continuation else {
                // Closed without done/error/tool request.  Treat as a
                // completion so a quiet backend doesn't hang the caller.
                tracing::warn!(round, "stream closed without a terminal event");
                return Ok(SessionOutcome::Completed {
                    final_response: NO_RESPONSE_FALLBACK.to_string(),
                    rounds_used: round + 1,
                });
            };

            // ── Tool dispatch ────────────────────────────────────────
            self.observer.on_tool_call(&tool, &args);

            // The backend's token fully replaces local history from here on.
            history = History::Token(token);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
                outcome = dispatch(&tool, &args, &request.capabilities, self.executor.as_ref()) => outcome,
            };
            self.observer.on_tool_result(&outcome);
            pending_tool = Some(outcome);
        }

        tracing::warn!(max_rounds = self.max_rounds, "loop limit reached");
        Err(Error::LoopLimit(self.max_rounds))
    }

    /// Forward an informational event to the observer.
    fn forward(&self, event: &AgentEvent) {
        match event {
            AgentEvent::Progress { message } => self.observer.on_progress(message),
            AgentEvent::Reflection { assessment, reasoning } => {
                self.observer.on_reflection(assessment, reasoning)
            }
            AgentEvent::CommandSelected { command } => {
                self.observer.on_command_selected(command)
            }
            AgentEvent::CommandOutput { command, output, error } => {
                // An error here tags the output as failed; it is not fatal.
                self.observer
                    .on_command_output(command, output, error.as_deref())
            }
            AgentEvent::PlanCreated { plan, total_steps } => {
                self.observer.on_plan_created(plan, *total_steps)
            }
            AgentEvent::StepCompleted { step, summary } => {
                self.observer.on_step_completed(*step, summary)
            }
            AgentEvent::StepFailed { step, error } => {
                self.observer.on_step_failed(*step, error)
            }
            AgentEvent::PlanComplete { total_steps } => {
                self.observer.on_plan_complete(*total_steps)
            }
            // Terminal events never reach here; transition() routes them.
            AgentEvent::ToolCallRequest { .. }
            | AgentEvent::Done { .. }
            | AgentEvent::Error { .. } => {}
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_request_transitions_to_call_tool() {
        let t = transition(AgentEvent::ToolCallRequest {
            tool: "k8s_get_pods".into(),
            args: serde_json::json!({}),
            history: serde_json::json!({"h": 1}),
        });
        match t {
            Transition::CallTool { tool, history, .. } => {
                assert_eq!(tool, "k8s_get_pods");
                assert_eq!(history["h"], 1);
            }
            other => panic!("wrong transition: {other:?}"),
        }
    }

    #[test]
    fn done_transitions_to_finish_with_optional_response() {
        match transition(AgentEvent::Done { final_response: None }) {
            Transition::Finish(None) => {}
            other => panic!("wrong transition: {other:?}"),
        }
        match transition(AgentEvent::Done {
            final_response: Some("ok".into()),
        }) {
            Transition::Finish(Some(r)) => assert_eq!(r, "ok"),
            other => panic!("wrong transition: {other:?}"),
        }
    }

    #[test]
    fn error_transitions_to_fail_verbatim() {
        match transition(AgentEvent::Error {
            message: "model exploded".into(),
        }) {
            Transition::Fail(m) => assert_eq!(m, "model exploded"),
            other => panic!("wrong transition: {other:?}"),
        }
    }

    #[test]
    fn informational_events_transition_to_notify() {
        let events = [
            AgentEvent::Progress { message: "p".into() },
            AgentEvent::Reflection {
                assessment: "a".into(),
                reasoning: "r".into(),
            },
            AgentEvent::CommandSelected { command: "c".into() },
            AgentEvent::PlanCreated {
                plan: "plan".into(),
                total_steps: 3,
            },
            AgentEvent::StepFailed {
                step: 1,
                error: "e".into(),
            },
            AgentEvent::PlanComplete { total_steps: 3 },
        ];
        for ev in events {
            assert!(matches!(transition(ev), Transition::Notify(_)));
        }
    }
}
