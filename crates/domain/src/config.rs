use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    /// Load the config from disk.
    ///
    /// Resolution order: explicit `path` argument, then the
    /// `HELMSMAN_CONFIG` env var, then `helmsman.toml` in the working
    /// directory.  A missing file yields the defaults; a file that exists
    /// but does not parse is an error.
    pub fn load(path: Option<&str>) -> Result<(Config, String)> {
        let config_path = match path {
            Some(p) => p.to_owned(),
            None => std::env::var("HELMSMAN_CONFIG").unwrap_or_else(|_| "helmsman.toml".into()),
        };

        let config = if std::path::Path::new(&config_path).exists() {
            let raw = std::fs::read_to_string(&config_path)
                .map_err(|e| Error::Config(format!("reading {config_path}: {e}")))?;
            toml::from_str(&raw)
                .map_err(|e| Error::Config(format!("parsing {config_path}: {e}")))?
        } else {
            tracing::debug!(path = %config_path, "no config file, using defaults");
            Config::default()
        };

        Ok((config, config_path))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent server connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_health_path")]
    pub health_path: String,
    /// Per-round request timeout.  Rounds stream for a while; keep generous.
    #[serde(default = "d_120000")]
    pub request_timeout_ms: u64,
    /// Liveness probe deadline.
    #[serde(default = "d_1000")]
    pub probe_timeout_ms: u64,
    /// Total budget for awaiting backend startup in `ensure_running`.
    #[serde(default = "d_15000")]
    pub startup_max_wait_ms: u64,
    #[serde(default = "d_500")]
    pub startup_poll_interval_ms: u64,
    /// Provider selection forwarded to the backend (e.g. "auto", "openai").
    #[serde(default = "d_provider")]
    pub provider: String,
    /// Hard cap on rounds per session — the safety valve against runaway
    /// agent loops.
    #[serde(default = "d_max_rounds")]
    pub max_rounds: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            health_path: d_health_path(),
            request_timeout_ms: d_120000(),
            probe_timeout_ms: d_1000(),
            startup_max_wait_ms: d_15000(),
            startup_poll_interval_ms: d_500(),
            provider: d_provider(),
            max_rounds: d_max_rounds(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://127.0.0.1:8765".into()
}
fn d_health_path() -> String {
    "/healthz".into()
}
fn d_120000() -> u64 {
    120_000
}
fn d_1000() -> u64 {
    1000
}
fn d_15000() -> u64 {
    15_000
}
fn d_500() -> u64 {
    500
}
fn d_provider() -> String {
    "auto".into()
}
fn d_max_rounds() -> usize {
    10
}
