// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Listing the registry's clusters together with their generated kubeconfigs.

use crate::constants::registry as api;
use crate::error::Result;
use crate::registry::http::RegistryApi;
use crate::registry::json_path::{required_array, required_str, string_or};
use crate::types::RemoteCluster;
use http::Method;
use serde_json::Value;
use tracing::{debug, instrument};

/// Fetch every cluster the registry reports, in registry order.
///
/// Either all clusters (each with its kubeconfig) are returned or the first error is.
#[instrument(skip(registry))]
pub async fn list_clusters<A: RegistryApi>(registry: &A) -> Result<Vec<RemoteCluster>> {
    let json = registry
        .api_call(Method::GET, api::CLUSTERS_PATH, &[], None)
        .await?;

    let entries = required_array(&json, api::DATA_PATH)?;
    let mut clusters = Vec::with_capacity(entries.len());

    for entry in entries {
        let id = required_str(entry, api::ID_PATH)?;
        let name = required_str(entry, api::NAME_PATH)?;
        let kubeconfig_contents = generate_kubeconfig(registry, id).await?;

        clusters.push(RemoteCluster {
            id: id.to_string(),
            name: name.to_string(),
            server_address: server_address(entry),
            cluster_type: string_or(entry, api::TYPE_PATH, ""),
            kubeconfig_contents,
            prometheus_url: None,
        });
    }

    debug!("Registry reported {} clusters", clusters.len());
    Ok(clusters)
}

/// `host:port` from the cluster's labels, each part empty when absent
fn server_address(entry: &Value) -> String {
    format!(
        "{}:{}",
        string_or(entry, api::K8S_API_HOST_PATH, ""),
        string_or(entry, api::K8S_API_PORT_PATH, "")
    )
}

async fn generate_kubeconfig<A: RegistryApi>(registry: &A, cluster_id: &str) -> Result<String> {
    let path = format!("{}/{}", api::CLUSTERS_PATH, cluster_id);
    let json = registry
        .api_call(
            Method::POST,
            &path,
            &[(api::ACTION_PARAM, api::GENERATE_KUBECONFIG_ACTION)],
            None,
        )
        .await?;

    Ok(required_str(&json, api::CONFIG_PATH)?.to_string())
}
