// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::labels;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "verrazzano.io", version = "v1beta1", kind = "VerrazzanoManagedCluster")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct VerrazzanoManagedClusterSpec {
    /// Name of the secret holding the cluster's kubeconfig
    pub kubeconfig_secret: String,
    /// `host:port` of the cluster's API server
    pub server_address: String,
    /// Provisioner tag reported by the registry, e.g. "oke"
    #[serde(rename = "type")]
    pub cluster_type: String,
}

impl VerrazzanoManagedCluster {
    /// Check if this record carries the labels fleetsync puts on the records it owns
    pub fn is_fleet_managed(&self) -> bool {
        let applied = self.labels();
        applied.get(labels::APP).is_some_and(|v| v == labels::APP_VALUE)
            && applied.contains_key(labels::CLUSTER)
    }
}
