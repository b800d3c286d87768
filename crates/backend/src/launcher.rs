//! Seam to the process-launcher collaborator.
//!
//! Starting the agent server process is outside this subsystem; the prober
//! only *requests* a start through this trait and then confirms readiness
//! via its own poll loop.

use hm_domain::error::Result;

#[async_trait::async_trait]
pub trait BackendLauncher: Send + Sync {
    /// Ask the collaborator to start the agent server.  Readiness is never
    /// inferred from this call succeeding — only from the health probe.
    async fn request_start(&self) -> Result<()>;
}

/// Launcher for deployments where the agent server is managed externally.
/// Requesting a start is a no-op; the poll loop still runs.
pub struct NoopLauncher;

#[async_trait::async_trait]
impl BackendLauncher for NoopLauncher {
    async fn request_start(&self) -> Result<()> {
        tracing::warn!("no launcher configured; waiting for the agent server to come up on its own");
        Ok(())
    }
}
