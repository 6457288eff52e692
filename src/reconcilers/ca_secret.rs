// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CA secret reconciler - reloads the registry CA when the ingress TLS secret changes.

use crate::constants::registry::{CA_CERT_KEY, INGRESS_NAMESPACE, INGRESS_TLS_SECRET};
use crate::error::{FleetSyncError, Result};
use crate::registry::ConnectionConfig;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct CaSecretReconciler {
    client: Client,
    connection: ConnectionConfig,
}

impl CaSecretReconciler {
    pub fn new(client: Client, connection: ConnectionConfig) -> Self {
        Self { client, connection }
    }

    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), INGRESS_NAMESPACE);
        let watcher_config =
            WatcherConfig::default().fields(&format!("metadata.name={}", INGRESS_TLS_SECRET));
        let context = Arc::new(self);

        Controller::new(secrets, watcher_config)
            .graceful_shutdown_on(shutdown.cancelled_owned())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled CA secret: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        info!("CA secret reconciler stopped");
        Ok(())
    }
}

async fn reconcile(secret: Arc<Secret>, ctx: Arc<CaSecretReconciler>) -> Result<Action> {
    handle_ca_secret(&ctx.connection, &secret);
    Ok(Action::await_change())
}

/// Swap the registry CA for the `ca.crt` of `secret` if it is the ingress TLS secret and
/// the bytes differ. Returns whether the CA was replaced.
pub fn handle_ca_secret(connection: &ConnectionConfig, secret: &Secret) -> bool {
    if secret.name_any() != INGRESS_TLS_SECRET
        || secret.namespace().as_deref() != Some(INGRESS_NAMESPACE)
    {
        return false;
    }

    let ca = ca_certificate(secret);
    let replaced = connection.replace_ca_if_changed(ca);
    if replaced {
        info!(
            "Reloaded registry CA from secret {}/{}",
            INGRESS_NAMESPACE, INGRESS_TLS_SECRET
        );
    }
    replaced
}

/// Read the registry CA at start-up; empty when the secret is unavailable
pub async fn fetch_ca_certificate(client: &Client) -> Vec<u8> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), INGRESS_NAMESPACE);

    match secrets.get_opt(INGRESS_TLS_SECRET).await {
        Ok(Some(secret)) => ca_certificate(&secret).to_vec(),
        Ok(None) => {
            warn!(
                "Secret {}/{} not found, trusting system roots only",
                INGRESS_NAMESPACE, INGRESS_TLS_SECRET
            );
            Vec::new()
        }
        Err(e) => {
            warn!(
                "Error getting secret {}/{}: {}",
                INGRESS_NAMESPACE, INGRESS_TLS_SECRET, e
            );
            Vec::new()
        }
    }
}

fn ca_certificate(secret: &Secret) -> &[u8] {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(CA_CERT_KEY))
        .map(|b| b.0.as_slice())
        .unwrap_or_default()
}

fn error_policy(
    _secret: Arc<Secret>,
    error: &FleetSyncError,
    _ctx: Arc<CaSecretReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}
