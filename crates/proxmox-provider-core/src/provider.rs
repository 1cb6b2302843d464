//! Poll scheduler.
//!
//! A [`Provider`] owns one background task that runs a discovery and
//! synthesis pass immediately on [`Provider::start`] and then once per poll
//! interval, publishing each [`RoutingConfiguration`] on an mpsc channel.
//! Failed passes are logged and retried on the next tick; a panic inside the
//! task is caught and logged, and ends the task.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use proxmox_provider_client::{ClientConfig, ProxmoxClient};
use proxmox_provider_types::models::MIN_POLL_INTERVAL;
use proxmox_provider_types::{ConfigError, ProviderConfig, ProviderError, RoutingConfiguration};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::catalog::build_catalog;
use crate::inventory::Inventory;
use crate::synthesize::synthesize;

/// Lifecycle of a [`Provider`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

pub struct Provider {
    name: String,
    poll_interval: Duration,
    inventory: Arc<dyn Inventory>,
    state: Mutex<ProviderState>,
    /// Flipped to `true` once on stop or drop
    shutdown_tx: watch::Sender<bool>,
}

impl Provider {
    /// Validate `config`, connect to the API and check it answers.
    pub async fn new(config: &ProviderConfig, name: impl Into<String>) -> Result<Self, ProviderError> {
        let settings = config.validate_settings()?;

        let client = ProxmoxClient::new(ClientConfig::from(&settings))
            .map_err(|e| ProviderError::Client { message: e.to_string() })?;

        let version = client.version().await.map_err(|e| ProviderError::Connectivity {
            endpoint: settings.api_endpoint.clone(),
            message: e.to_string(),
        })?;
        tracing::info!("Connected to Proxmox VE version {}", version.release);

        Self::with_inventory(name, settings.poll_interval, Arc::new(client))
    }

    /// Build a provider around any inventory, skipping the connectivity check.
    pub fn with_inventory(
        name: impl Into<String>,
        poll_interval: Duration,
        inventory: Arc<dyn Inventory>,
    ) -> Result<Self, ProviderError> {
        if poll_interval < MIN_POLL_INTERVAL {
            return Err(ConfigError::PollIntervalTooShort {
                value: format!("{:?}", poll_interval),
                minimum_secs: MIN_POLL_INTERVAL.as_secs(),
            }
            .into());
        }

        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            name: name.into(),
            poll_interval,
            inventory,
            state: Mutex::new(ProviderState::Idle),
            shutdown_tx,
        })
    }

    /// Spawn the polling task. The first pass runs without waiting for a tick.
    pub fn start(
        &self,
        tx: mpsc::Sender<RoutingConfiguration>,
    ) -> Result<JoinHandle<()>, ProviderError> {
        {
            let mut state = self.state.lock();
            if *state != ProviderState::Idle {
                return Err(ProviderError::InvalidState { state: state.to_string() });
            }
            *state = ProviderState::Running;
        }

        let poller = Poller {
            name: self.name.clone(),
            poll_interval: self.poll_interval,
            inventory: Arc::clone(&self.inventory),
            tx,
            shutdown_rx: self.shutdown_tx.subscribe(),
        };

        tracing::info!(
            "Provider {} started (interval: {}s)",
            self.name,
            self.poll_interval.as_secs_f64()
        );

        Ok(tokio::spawn(poller.supervise()))
    }

    /// Stop polling. Safe to call more than once.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state != ProviderState::Stopped {
            tracing::info!("Stopping provider {}", self.name);
            *state = ProviderState::Stopped;
        }
        self.shutdown_tx.send_replace(true);
    }

    pub fn state(&self) -> ProviderState {
        *self.state.lock()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("poll_interval", &self.poll_interval)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
    Published,
    /// Discovery failed; retry on the next tick
    Failed,
    /// Stop was requested while the pass was running
    Discarded,
    ChannelClosed,
}

struct Poller {
    name: String,
    poll_interval: Duration,
    inventory: Arc<dyn Inventory>,
    tx: mpsc::Sender<RoutingConfiguration>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Poller {
    async fn supervise(self) {
        let name = self.name.clone();
        if let Err(payload) = AssertUnwindSafe(self.run()).catch_unwind().await {
            tracing::error!("Recovered from panic in provider {}: {}", name, panic_message(&*payload));
        }
    }

    async fn run(mut self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => {
                    tracing::info!("Provider {} polling task shutting down", self.name);
                    break;
                }
                _ = ticker.tick() => {}
            }

            match self.poll_once().await {
                PassOutcome::Published | PassOutcome::Failed => {},
                PassOutcome::Discarded => {
                    tracing::debug!("Provider {} stopped mid-pass, snapshot discarded", self.name);
                    break;
                },
                PassOutcome::ChannelClosed => {
                    tracing::info!("Provider {} publish channel closed, polling task exiting", self.name);
                    break;
                },
            }
        }
    }

    async fn poll_once(&mut self) -> PassOutcome {
        let catalog = match build_catalog(self.inventory.as_ref()).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("Provider {} failed to build configuration: {}", self.name, e);
                return PassOutcome::Failed;
            },
        };

        let config = synthesize(&catalog);

        if *self.shutdown_rx.borrow() {
            return PassOutcome::Discarded;
        }

        tracing::debug!(
            "Publishing configuration with {} router(s) and {} service(s)",
            config.routers.len(),
            config.services.len()
        );

        tokio::select! {
            biased;
            _ = self.shutdown_rx.changed() => PassOutcome::Discarded,
            sent = self.tx.send(config) => match sent {
                Ok(()) => PassOutcome::Published,
                Err(_) => PassOutcome::ChannelClosed,
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
