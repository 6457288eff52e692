// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// A cluster as reported by the registry during one poll
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteCluster {
    /// Stable registry identifier, e.g. "c-ndvgb"
    pub id: String,
    pub name: String,
    /// `host:port` of the cluster's API server
    pub server_address: String,
    /// Provisioner tag, e.g. "oke"
    pub cluster_type: String,
    pub kubeconfig_contents: String,
    pub prometheus_url: Option<String>,
}
