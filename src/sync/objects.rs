// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The secret and record fleetsync wants to exist for a remote cluster.

use crate::constants::{labels, naming};
use crate::types::{RemoteCluster, VerrazzanoManagedCluster, VerrazzanoManagedClusterSpec};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Name of the secret holding a managed cluster's kubeconfig
pub fn kubeconfig_secret_name(cluster_name: &str) -> String {
    format!("{}-{}", naming::MANAGED_CLUSTER_PREFIX, cluster_name)
}

/// Labels marking a record or secret as owned by fleetsync
pub fn managed_labels(cluster_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (labels::APP.to_string(), labels::APP_VALUE.to_string()),
        (labels::CLUSTER.to_string(), cluster_name.to_string()),
    ])
}

/// Label selector matching everything fleetsync owns
pub fn managed_selector() -> String {
    format!("{}={}", labels::APP, labels::APP_VALUE)
}

pub fn desired_secret(cluster: &RemoteCluster, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(kubeconfig_secret_name(&cluster.name)),
            namespace: Some(namespace.to_string()),
            labels: Some(managed_labels(&cluster.name)),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            naming::KUBECONFIG_SECRET_KEY.to_string(),
            ByteString(cluster.kubeconfig_contents.as_bytes().to_vec()),
        )])),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

pub fn desired_record(cluster: &RemoteCluster, namespace: &str) -> VerrazzanoManagedCluster {
    VerrazzanoManagedCluster {
        metadata: ObjectMeta {
            name: Some(cluster.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(managed_labels(&cluster.name)),
            ..Default::default()
        },
        spec: VerrazzanoManagedClusterSpec {
            kubeconfig_secret: kubeconfig_secret_name(&cluster.name),
            server_address: cluster.server_address.clone(),
            cluster_type: cluster.cluster_type.clone(),
        },
    }
}
