//! Availability prober for the agent server.
//!
//! [`Prober::check_reachable`] is a single short-deadline liveness probe
//! that never errors; [`Prober::ensure_running`] layers the launcher
//! request and a poll loop on top of it for session preflight.

use std::time::{Duration, Instant};

use hm_domain::config::BackendConfig;
use hm_domain::error::{Error, Result};

use crate::launcher::BackendLauncher;

pub struct Prober {
    http: reqwest::Client,
    health_url: String,
    probe_timeout: Duration,
}

impl Prober {
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let base = cfg.base_url.trim_end_matches('/');
        Ok(Self {
            http,
            health_url: format!("{}{}", base, cfg.health_path),
            probe_timeout: Duration::from_millis(cfg.probe_timeout_ms),
        })
    }

    /// Issue one liveness probe with the given deadline.
    ///
    /// Any transport error, timeout, or non-2xx status yields `false`;
    /// this never raises.
    pub async fn check_reachable(&self, timeout: Duration) -> bool {
        match self.http.get(&self.health_url).timeout(timeout).send().await {
            Ok(resp) => {
                let up = resp.status().is_success();
                if !up {
                    tracing::debug!(status = %resp.status(), "health probe rejected");
                }
                up
            }
            Err(e) => {
                tracing::debug!(error = %e, "health probe failed");
                false
            }
        }
    }

    /// Make sure the agent server is up, starting it if needed.
    ///
    /// When the first probe fails, the launcher is asked *once* to start the
    /// backend, then `check_reachable` is polled at `poll_interval` until it
    /// succeeds or `max_wait` is exhausted.  No side effects beyond the one
    /// launch request.
    pub async fn ensure_running(
        &self,
        launcher: &dyn BackendLauncher,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> bool {
        if self.check_reachable(self.probe_timeout).await {
            return true;
        }

        tracing::info!(url = %self.health_url, "agent server down, requesting start");
        if let Err(e) = launcher.request_start().await {
            // The server may be starting through some other path; keep polling.
            tracing::warn!(error = %e, "launch request failed");
        }

        let deadline = Instant::now() + max_wait;
        loop {
            tokio::time::sleep(poll_interval).await;
            if self.check_reachable(self.probe_timeout).await {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!(waited_ms = max_wait.as_millis() as u64, "agent server never became ready");
                return false;
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
