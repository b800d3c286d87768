//! Client for the agent server's streaming round endpoint.
//!
//! [`AgentBackend`] is the seam the session driver talks through; the
//! production implementation is [`HttpAgentClient`], which POSTs one round
//! payload and decodes the `data: <json>` response body into an event
//! stream.  Tests substitute a scripted backend behind the same trait.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use hm_domain::capability::{Capability, ToolOutcome};
use hm_domain::chat::History;
use hm_domain::config::BackendConfig;
use hm_domain::error::{Error, Result};
use hm_domain::event::EventStream;

use crate::decode::EventDecoder;
use crate::launcher::BackendLauncher;
use crate::probe::Prober;
use crate::util::from_reqwest;

/// Path of the streaming round endpoint.
const STREAM_PATH: &str = "/v1/agent/stream";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Round payload
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The payload sent to the backend for one round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundRequest {
    /// The user's goal text, unchanged across rounds.
    pub query: String,
    /// Environment context (cluster name, namespace, kubeconfig summary).
    pub context: String,
    /// Provider selection forwarded to the backend.
    pub provider: String,
    /// Outcome of the tool invocation requested by the previous round.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<ToolOutcome>,
    /// Local messages on round 0; the backend's opaque token afterwards.
    pub history: History,
    /// The capability catalog, identical every round.
    pub capabilities: Vec<Capability>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backend seam
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
pub trait AgentBackend: Send + Sync {
    /// Preflight: make sure the backend is up, starting it if possible.
    async fn ensure_running(&self) -> bool;

    /// Send one round payload and return its decoded event stream.
    async fn send_round(&self, req: &RoundRequest) -> Result<EventStream>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Created once per process and reused across sessions; the underlying
/// `reqwest::Client` maintains a connection pool.
pub struct HttpAgentClient {
    http: reqwest::Client,
    stream_url: String,
    prober: Prober,
    launcher: Arc<dyn BackendLauncher>,
    startup_max_wait: Duration,
    startup_poll_interval: Duration,
}

impl HttpAgentClient {
    pub fn new(cfg: &BackendConfig, launcher: Arc<dyn BackendLauncher>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let base = cfg.base_url.trim_end_matches('/');

        Ok(Self {
            http,
            stream_url: format!("{base}{STREAM_PATH}"),
            prober: Prober::new(cfg)?,
            launcher,
            startup_max_wait: Duration::from_millis(cfg.startup_max_wait_ms),
            startup_poll_interval: Duration::from_millis(cfg.startup_poll_interval_ms),
        })
    }
}

#[async_trait::async_trait]
impl AgentBackend for HttpAgentClient {
    async fn ensure_running(&self) -> bool {
        self.prober
            .ensure_running(
                self.launcher.as_ref(),
                self.startup_max_wait,
                self.startup_poll_interval,
            )
            .await
    }

    async fn send_round(&self, req: &RoundRequest) -> Result<EventStream> {
        tracing::debug!(url = %self.stream_url, "sending round payload");

        let resp = self
            .http
            .post(&self.stream_url)
            .json(req)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(Error::Http(format!(
                "agent server returned HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        Ok(decoded_response_stream(resp))
    }
}

/// Turn a streaming response body into decoded events.
///
/// Chunks feed the carry-over decoder as they arrive; the trailing partial
/// record is flushed when the body closes.  A mid-stream transport error
/// ends the stream with a classified `Err`.
fn decoded_response_stream(response: reqwest::Response) -> EventStream {
    let stream = async_stream::stream! {
        let mut response = response;
        let mut decoder = EventDecoder::new();

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    for event in decoder.feed(&bytes) {
                        yield Ok(event);
                    }
                }
                Ok(None) => {
                    for event in decoder.finish() {
                        yield Ok(event);
                    }
                    break;
                }
                Err(e) => {
                    yield Err(from_reqwest(e));
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}
