//! Proxmox Provider - Headless Daemon
//!
//! Polls a Proxmox VE cluster and publishes Traefik dynamic configuration
//! for every running guest whose description carries `traefik.*` labels.
//! Snapshots go to stdout, one JSON document per line, or replace `--output`.

use anyhow::{Context, Result};
use clap::Parser;
use proxmox_provider_core::logger::{self, LoggerOptions};
use proxmox_provider_core::Provider;
use proxmox_provider_types::ProviderConfig;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod cli;
mod output;

use cli::Cli;
use output::Sink;

const PROVIDER_NAME: &str = "proxmox";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.apply(load_config(cli.config.as_deref())?);

    let options = LoggerOptions {
        level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
        ..Default::default()
    }
    .with_api_debug(config.api_logging.trim().eq_ignore_ascii_case("debug"));
    let _guard = logger::init(&options).context("Failed to initialize logging")?;

    info!("Proxmox provider {} starting", env!("CARGO_PKG_VERSION"));

    let provider = Provider::new(&config, PROVIDER_NAME).await.context("Failed to create provider")?;
    let sink = Sink::new(cli.output.clone());

    let (tx, mut rx) = mpsc::channel(1);
    let handle = provider.start(tx)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            snapshot = rx.recv() => {
                let Some(snapshot) = snapshot else {
                    warn!("Provider task ended, exiting");
                    break;
                };
                if let Err(e) = sink.publish(&snapshot) {
                    tracing::error!("Failed to publish configuration: {:#}", e);
                }
                if cli.once {
                    break;
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutdown requested");
                break;
            }
        }
    }

    provider.stop();
    handle.await.context("Provider task failed")?;
    info!("Proxmox provider stopped");

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ProviderConfig> {
    let Some(path) = path else {
        return Ok(ProviderConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}
