// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Create-or-update of the kubeconfig secret and record for one remote cluster.

use crate::constants::OPERATOR_NAME;
use crate::error::{FleetSyncError, Result};
use crate::sync::diff::compare_ignore_target_empties;
use crate::sync::objects::{desired_record, desired_secret, kubeconfig_secret_name};
use crate::types::{RemoteCluster, VerrazzanoManagedCluster};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{DeleteParams, PostParams},
    runtime::reflector::{ObjectRef, Store},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// What a sync did to one object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Writes the records and secrets for remote clusters into the target namespace.
///
/// Existing state is read from the reflector stores, never from the API server.
#[derive(Clone)]
pub struct ClusterSynchronizer {
    client: Client,
    namespace: String,
    secrets: Store<Secret>,
    records: Store<VerrazzanoManagedCluster>,
}

impl ClusterSynchronizer {
    pub fn new(
        client: Client,
        namespace: impl Into<String>,
        secrets: Store<Secret>,
        records: Store<VerrazzanoManagedCluster>,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            secrets,
            records,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Bring the secret and the record of `cluster` up to date.
    ///
    /// Both are always attempted; the first failure is returned after both ran.
    #[instrument(skip(self, cluster), fields(cluster = %cluster.name, id = %cluster.id))]
    pub async fn synchronize(&self, cluster: &RemoteCluster) -> Result<()> {
        let secret_result = self.sync_secret(cluster).await;
        if let Err(e) = &secret_result {
            error!(
                "Failed to create/update kubeconfig secret for cluster {}: {}",
                cluster.name, e
            );
        }

        let record_result = self.sync_record(cluster).await;
        if let Err(e) = &record_result {
            error!(
                "Failed to create/update managed cluster record for cluster {}: {}",
                cluster.name, e
            );
        }

        secret_result.and(record_result).map(|_| ())
    }

    pub async fn sync_secret(&self, cluster: &RemoteCluster) -> Result<WriteOutcome> {
        let desired = desired_secret(cluster, &self.namespace);
        let existing = self.secrets.get(&self.object_ref(&desired.name_any()));
        self.apply(self.api(), "Secret", desired, existing).await
    }

    pub async fn sync_record(&self, cluster: &RemoteCluster) -> Result<WriteOutcome> {
        let desired = desired_record(cluster, &self.namespace);
        let existing = self.records.get(&self.object_ref(&desired.name_any()));
        self.apply(self.api(), "VerrazzanoManagedCluster", desired, existing)
            .await
    }

    /// Delete the record and the secret of the cluster named `cluster_name`.
    ///
    /// Objects missing from the cache yield `ObjectNotFound`. Both deletes are attempted.
    #[instrument(skip(self))]
    pub async fn remove(&self, cluster_name: &str) -> Result<()> {
        let record_result = self
            .delete::<VerrazzanoManagedCluster>(
                &self.records,
                "VerrazzanoManagedCluster",
                cluster_name,
            )
            .await;
        let secret_result = self
            .delete::<Secret>(&self.secrets, "Secret", &kubeconfig_secret_name(cluster_name))
            .await;

        record_result.and(secret_result)
    }

    /// Names of the fleet-managed records currently cached in the target namespace
    pub fn managed_record_names(&self) -> Vec<String> {
        self.records
            .state()
            .iter()
            .filter(|r| r.is_fleet_managed())
            .filter(|r| r.namespace().as_deref() == Some(self.namespace.as_str()))
            .map(|r| r.name_any())
            .collect()
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn object_ref<K>(&self, name: &str) -> ObjectRef<K>
    where
        K: Resource,
        <K as Resource>::DynamicType: Default,
    {
        ObjectRef::new(name).within(&self.namespace)
    }

    async fn apply<K>(
        &self,
        api: Api<K>,
        kind: &str,
        mut desired: K,
        existing: Option<Arc<K>>,
    ) -> Result<WriteOutcome>
    where
        K: Resource + Clone + Serialize + DeserializeOwned + Debug,
    {
        let name = desired.name_any();
        let what = format!("{} {}/{}", kind, self.namespace, name);
        let pp = PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        };

        let Some(existing) = existing else {
            info!("Creating {}", what);
            api.create(&pp, &desired)
                .await
                .map_err(|e| FleetSyncError::from_write(&what, e))?;
            return Ok(WriteOutcome::Created);
        };

        let diffs = compare_ignore_target_empties(existing.as_ref(), &desired);
        if diffs.is_empty() {
            debug!("No need to update existing {}", what);
            return Ok(WriteOutcome::Unchanged);
        }

        info!("Updating {}", what);
        debug!("Differences: {}", diffs.join(", "));
        desired.meta_mut().resource_version = existing.meta().resource_version.clone();
        api.replace(&name, &pp, &desired)
            .await
            .map_err(|e| FleetSyncError::from_write(&what, e))?;

        Ok(WriteOutcome::Updated)
    }

    async fn delete<K>(&self, store: &Store<K>, kind: &str, name: &str) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug + 'static,
        <K as Resource>::DynamicType: Default + Eq + Hash + Clone,
    {
        let what = format!("{} {}/{}", kind, self.namespace, name);
        if store.get(&self.object_ref(name)).is_none() {
            return Err(FleetSyncError::ObjectNotFound(format!("{} no longer exists", what)));
        }

        info!("Deleting {}", what);
        self.api::<K>()
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| FleetSyncError::from_write(&what, e))?;

        Ok(())
    }
}
