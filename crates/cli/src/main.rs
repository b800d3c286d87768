//! `helmsman` — run one cluster-ops query against the agent server.
//!
//! `helmsman run "<query>"` sends the query through the session driver,
//! streams progress to stderr (or JSON lines to stdout), prints the final
//! response, and exits.  `helmsman config show` dumps the resolved
//! configuration.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use hm_backend::{HttpAgentClient, NoopLauncher};
use hm_domain::config::Config;
use hm_domain::error::Result;
use hm_session::{CapabilityExecutor, SessionDriver, SessionOutcome, SessionRequest};

use printer::ConsoleObserver;

mod printer;

/// Helmsman — a cluster-ops assistant backed by an agent server.
#[derive(Debug, Parser)]
#[command(name = "helmsman", version, about)]
struct Cli {
    /// Path to the config file (defaults to $HELMSMAN_CONFIG, then
    /// helmsman.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a single query to the agent and print the response.
    Run {
        /// The query to run (e.g. "list failing pods in staging").
        query: String,

        /// Environment context forwarded to the agent (cluster, namespace).
        #[arg(long, default_value = "")]
        context: String,

        /// Provider override (e.g. "auto", "openai").
        #[arg(long)]
        provider: Option<String>,

        /// Emit progress events as JSON lines on stdout instead of pretty
        /// text on stderr.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// The CLI ships no capability executors; a backend that requests one gets
/// a recoverable failure folded into its next round.
struct RefusingExecutor;

#[async_trait::async_trait]
impl CapabilityExecutor for RefusingExecutor {
    async fn invoke(
        &self,
        capability: &hm_domain::capability::Capability,
        _args: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        Err(hm_domain::error::Error::Config(format!(
            "no executor registered for '{}'",
            capability.name
        )))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let (config, config_path) = Config::load(cli.config.as_deref())
        .context("loading configuration")?;
    tracing::debug!(path = %config_path, "configuration resolved");

    match cli.command {
        Command::Run { query, context, provider, json } => {
            run(config, query, context, provider, json).await
        }
        Command::Config(ConfigCommand::Show) => {
            let rendered = toml::to_string_pretty(&config)
                .context("rendering configuration")?;
            print!("{rendered}");
            Ok(())
        }
    }
}

async fn run(
    config: Config,
    query: String,
    context: String,
    provider: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let backend = Arc::new(
        HttpAgentClient::new(&config.backend, Arc::new(NoopLauncher))
            .context("building agent client")?,
    );
    let driver = SessionDriver::new(backend, Arc::new(RefusingExecutor))
        .with_observer(Arc::new(ConsoleObserver::new(json)))
        .with_max_rounds(config.backend.max_rounds);

    let request = SessionRequest {
        query: query.clone(),
        context,
        history: vec![hm_domain::chat::ChatMessage::user(query)],
        capabilities: Vec::new(),
        provider: provider.unwrap_or(config.backend.provider),
    };

    // Ctrl-C cancels the session; the driver resolves to Cancelled rather
    // than tearing the process down mid-round.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received SIGINT, cancelling session");
            signal_cancel.cancel();
        }
    });

    match driver.run(request, cancel).await {
        Ok(SessionOutcome::Completed { final_response, rounds_used }) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "final_response": final_response,
                        "rounds_used": rounds_used,
                    })
                );
            } else {
                println!("{final_response}");
            }
            Ok(())
        }
        Ok(SessionOutcome::Cancelled) => {
            eprintln!("cancelled");
            std::process::exit(130);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
