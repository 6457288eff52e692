// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Periodic reconciliation of the registry's clusters into local records.

use crate::config::Config;
use crate::error::{FleetSyncError, Result};
use crate::registry::{list_clusters, RegistryApi};
use crate::sync::synchronizer::ClusterSynchronizer;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Where the poll loop currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Polling,
    Synchronizing,
    Stopped,
}

/// Result of one poll of the registry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Clusters reported by the registry
    pub clusters: usize,
    pub synced: usize,
    pub failed: usize,
    pub pruned: usize,
}

/// Polls the registry and synchronizes every reported cluster, one tick at a time
pub struct ClusterSyncManager<A> {
    registry: A,
    synchronizer: ClusterSynchronizer,
    poll_interval: Duration,
    prune_removed_clusters: bool,
    state: watch::Sender<LoopState>,
}

impl<A: RegistryApi> ClusterSyncManager<A> {
    pub fn new(registry: A, synchronizer: ClusterSynchronizer, config: &Config) -> Self {
        Self {
            registry,
            synchronizer,
            poll_interval: config.poll_interval,
            prune_removed_clusters: config.prune_removed_clusters,
            state: watch::channel(LoopState::Idle).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    /// Poll until `shutdown` is cancelled. A tick that is still running when the next
    /// one is due causes that next tick to be skipped.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!(
            "Polling cluster registry every {}s",
            self.poll_interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.poll_once().await {
                Ok(summary) => info!(
                    clusters = summary.clusters,
                    synced = summary.synced,
                    failed = summary.failed,
                    pruned = summary.pruned,
                    "Synced cluster registry"
                ),
                Err(e) => error!("Failed to get registry managed clusters: {}", e),
            }
            self.state.send_replace(LoopState::Idle);
        }

        self.state.send_replace(LoopState::Stopped);
        info!("Cluster registry polling stopped");
        Ok(())
    }

    /// List the registry once and synchronize every cluster it reports, in registry order.
    ///
    /// Fails only when the registry cannot be listed; per-cluster failures are counted.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> Result<PollSummary> {
        self.state.send_replace(LoopState::Polling);
        let clusters = list_clusters(&self.registry).await?;

        self.state.send_replace(LoopState::Synchronizing);
        let mut summary = PollSummary {
            clusters: clusters.len(),
            ..Default::default()
        };

        for cluster in &clusters {
            debug!(
                "Syncing managed cluster: id='{}', name='{}'",
                cluster.id, cluster.name
            );
            match self.synchronizer.synchronize(cluster).await {
                Ok(()) => summary.synced += 1,
                Err(_) => summary.failed += 1,
            }
        }

        if self.prune_removed_clusters {
            let reported: HashSet<&str> = clusters.iter().map(|c| c.name.as_str()).collect();
            summary.pruned = self.prune(&reported).await;
        }

        Ok(summary)
    }

    async fn prune(&self, reported: &HashSet<&str>) -> usize {
        let mut pruned = 0;
        for name in self.synchronizer.managed_record_names() {
            if reported.contains(name.as_str()) {
                continue;
            }
            info!("Cluster '{}' is no longer reported by the registry, removing it", name);
            match self.synchronizer.remove(&name).await {
                Ok(()) => pruned += 1,
                Err(FleetSyncError::ObjectNotFound(msg)) => {
                    // The secret may already be gone while the record was still cached
                    warn!("Partially removed cluster '{}': {}", name, msg);
                    pruned += 1;
                }
                Err(e) => error!("Failed to remove cluster '{}': {}", name, e),
            }
        }
        pruned
    }
}
