//! HTTP edge of the Helmsman orchestrator: the agent-server client, the
//! streaming event decoder, the availability prober, and the launcher seam.

pub mod client;
pub mod decode;
pub mod launcher;
pub mod probe;
mod util;

pub use client::{AgentBackend, HttpAgentClient, RoundRequest};
pub use decode::EventDecoder;
pub use launcher::{BackendLauncher, NoopLauncher};
pub use probe::Prober;
