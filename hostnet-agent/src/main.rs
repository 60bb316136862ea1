//! Hostnet Agent - Local network topology reporter
//!
//! Runs on every host of the cluster:
//! - Loads its config and sets up logging
//! - Resolves the overlay networks local to this host from the metadata snapshot
//! - Reports bridge, router container and bridge address state per network

mod bridges;
mod config;
mod snapshot;

use anyhow::{Context, Result};
use config::AgentConfig;
use hostnet_resolver::{has_address_from_subnet, resolve_local_from_metadata, MetadataSnapshot};
use snapshot::SnapshotClient;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Main agent state
struct Agent {
    config: AgentConfig,
    metadata: SnapshotClient,
}

impl Agent {
    fn new(config: AgentConfig) -> Self {
        let metadata = SnapshotClient::new(&config.metadata.snapshot_path);
        Self { config, metadata }
    }

    /// Start agent main loop
    async fn run(&self) -> Result<()> {
        if self.config.resolver.run_once {
            return self.reconcile().await.map(|_| ());
        }

        info!(
            "Starting reconcile loop every {}s",
            self.config.resolver.poll_interval_secs
        );
        let mut reconcile_timer = interval(Duration::from_secs(self.config.resolver.poll_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = reconcile_timer.tick() => {
                    if let Err(e) = self.reconcile().await {
                        error!("Reconcile failed: {:#}", e);
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Run one reconcile cycle on the blocking pool, it reads the snapshot
    /// file and the host interfaces
    async fn reconcile(&self) -> Result<usize> {
        let metadata = self.metadata.clone();
        tokio::task::spawn_blocking(move || reconcile(&metadata))
            .await
            .context("Reconcile task failed")?
    }
}

/// Load the snapshot once and report every local network it describes
fn reconcile(metadata: &SnapshotClient) -> Result<usize> {
    let snapshot = metadata.load().context("Failed to load metadata snapshot")?;
    reconcile_snapshot(&snapshot)
}

fn reconcile_snapshot(snapshot: &MetadataSnapshot) -> Result<usize> {
    let topology = resolve_local_from_metadata(snapshot).unwrap_or_else(|never| match never {});

    if topology.driver_selection.is_anomaly() {
        warn!("Network driver selection: {:?}", topology.driver_selection);
    }
    if topology.networks.is_empty() {
        info!("No local networks for host {}", topology.host.uuid);
    }

    let statuses = bridges::collect_statuses(&topology, has_address_from_subnet);
    bridges::report(&statuses);

    debug!(
        "Statuses: {}",
        serde_json::to_string(&statuses).context("Failed to serialize network statuses")?
    );
    Ok(statuses.len())
}

fn init_logging(config: &AgentConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AgentConfig::load().await.context("Failed to load config")?;
    init_logging(&config);

    info!("Hostnet Agent starting...");
    debug!("Config: {:?}", config);

    let agent = Agent::new(config);
    agent.run().await.context("Agent execution failed")?;

    Ok(())
}
