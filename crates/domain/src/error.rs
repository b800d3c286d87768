/// Shared error type used across all Helmsman crates.
///
/// Connection-level failures are classified into distinct variants so the
/// session driver can surface user-actionable messages instead of raw socket
/// errors.  Cancellation is deliberately *not* an error — a cancelled session
/// resolves to `SessionOutcome::Cancelled`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport error with original detail preserved.
    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// Preflight failed: the agent server never became ready.
    #[error("agent server is not available; start it and try again")]
    Unavailable,

    /// Connection refused / host unreachable mid-session.  Fixed message;
    /// the raw socket error is logged, never surfaced.
    #[error("Agent Server Unreachable. Check that the agent server is running, then retry.")]
    Unreachable,

    /// The backend emitted an explicit `error` event.  The message is
    /// passed through verbatim.
    #[error("{0}")]
    Agent(String),

    /// The session hit the round bound without a terminal event.
    #[error("agent loop limit reached after {0} rounds without a final response")]
    LoopLimit(usize),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
