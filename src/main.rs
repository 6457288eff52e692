// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fleetsync::config::Config;
use fleetsync::kubernetes::{managed_store, wait_for_managed_cluster_crd};
use fleetsync::reconcilers::{fetch_ca_certificate, CaSecretReconciler};
use fleetsync::registry::{ConnectionConfig, HttpRegistryApi, RetryPolicy};
use fleetsync::sync::{ClusterSyncManager, ClusterSynchronizer};
use fleetsync::types::VerrazzanoManagedCluster;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, defaulting to info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting fleetsync operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: registry_url={}, target_namespace={}, poll_interval={}s, prune_removed_clusters={}",
        config.registry_url,
        config.target_namespace,
        config.poll_interval.as_secs(),
        config.prune_removed_clusters
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for VerrazzanoManagedCluster CRD to become available...");
    wait_for_managed_cluster_crd(&client).await?;

    let ca_certificate = fetch_ca_certificate(&client).await;
    let connection = ConnectionConfig::from_config(&config, ca_certificate);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let (secrets, secrets_driver) = managed_store::<Secret>(client.clone(), &config.target_namespace);
    let (records, records_driver) =
        managed_store::<VerrazzanoManagedCluster>(client.clone(), &config.target_namespace);
    tokio::spawn(secrets_driver);
    tokio::spawn(records_driver);

    info!("Waiting for local caches to sync...");
    secrets.wait_until_ready().await?;
    records.wait_until_ready().await?;

    let synchronizer = ClusterSynchronizer::new(client.clone(), &config.target_namespace, secrets, records);
    let registry = HttpRegistryApi::new(connection.clone(), RetryPolicy::default(), shutdown.child_token());
    let manager = ClusterSyncManager::new(registry, synchronizer, &config);
    let ca_reconciler = CaSecretReconciler::new(client, connection);

    info!("Starting cluster registry sync...");
    tokio::try_join!(manager.run(shutdown.clone()), ca_reconciler.run(shutdown))?;

    info!("fleetsync operator stopped");
    Ok(())
}

async fn shutdown_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }

    info!("Received shutdown signal");
    shutdown.cancel();
}
