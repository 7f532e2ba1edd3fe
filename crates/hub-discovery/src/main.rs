//! Hub discovery command line tool.
//!
//! Sends mDNS browse queries on the local network, collects every hub that
//! answers within the timeout, confirms each one with an HTTP health check
//! and prints the confirmed hubs.
//!
//! # Usage
//!
//! ```text
//! hub-discover [OPTIONS]
//!
//! Options:
//!   --timeout <SECS>         Discovery window in seconds [default: from config, 5]
//!   --format <FORMAT>        json | table [default: from config, json]
//!   --config <PATH>          Read this config file instead of the default one
//!   --max-concurrent <N>     Parallel health checks [default: from config, 1]
//!   --debug                  Verbose logging
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                     | Description                          |
//! |------------------------------|--------------------------------------|
//! | `HUB_DISCOVER_TIMEOUT`       | Discovery window in seconds          |
//! | `HUB_DISCOVER_FORMAT`        | Output format                        |
//! | `HUB_DISCOVER_CONFIG`        | Config file path                     |
//! | `HUB_DISCOVER_MAX_CONCURRENT`| Parallel health checks               |
//! | `RUST_LOG`                   | Log filter (overrides `--debug`)     |
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the config file.
//!
//! Results go to stdout; logs and the table banner go to stderr, so
//! `hub-discover | jq` works.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hub_discovery::domain::DiscoveryConfig;
use hub_discovery::hub_discovery;
use hub_discovery::infrastructure::console::{
    render_json, render_table, searching_banner, OutputFormat,
};
use hub_discovery::infrastructure::storage::config::{load_config, load_config_from, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Find hubs on the local network.
#[derive(Debug, Parser)]
#[command(
    name = "hub-discover",
    about = "Discover and verify hubs on the local network via mDNS",
    version
)]
struct Cli {
    /// How long to listen for mDNS replies, in seconds.
    #[arg(long, env = "HUB_DISCOVER_TIMEOUT")]
    timeout: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, env = "HUB_DISCOVER_FORMAT")]
    format: Option<OutputFormat>,

    /// Path to a config file to use instead of the platform default.
    #[arg(long, env = "HUB_DISCOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Number of health checks to run in parallel.
    #[arg(long, env = "HUB_DISCOVER_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,
}

/// Everything one run needs, after merging file and command line.
#[derive(Debug)]
struct RunSettings {
    discovery: DiscoveryConfig,
    timeout: Duration,
    format: OutputFormat,
}

impl Cli {
    /// Applies the command line overrides on top of `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration does not validate.
    fn resolve(&self, file: AppConfig) -> anyhow::Result<RunSettings> {
        let mut file = file;
        if let Some(n) = self.max_concurrent {
            file.verification.max_concurrent = n;
        }

        let discovery = file
            .to_discovery_config()
            .context("invalid discovery configuration")?;

        Ok(RunSettings {
            discovery,
            timeout: Duration::from_secs(self.timeout.unwrap_or(file.discovery.timeout_secs)),
            format: self.format.unwrap_or(file.output.format),
        })
    }

    fn load_file(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => load_config().context("failed to load config"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --debug picks the level. Logs go to stderr so
    // stdout carries only the result.
    let fallback = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.resolve(cli.load_file()?)?;
    let discovery =
        hub_discovery(&settings.discovery).context("failed to set up hub verification")?;

    if settings.format == OutputFormat::Table {
        eprintln!("{}", searching_banner(settings.timeout));
    }

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, stopping discovery");
                cancel_on_signal.cancel();
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let hubs = discovery
        .discover_and_verify(settings.timeout, &cancel)
        .await
        .context("hub discovery failed")?;

    match settings.format {
        OutputFormat::Json => {
            println!("{}", render_json(&hubs).context("failed to serialize results")?)
        }
        OutputFormat::Table => print!("{}", render_table(&hubs)),
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
