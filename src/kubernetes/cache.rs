// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch-backed caches of the secrets and records fleetsync owns.

use crate::sync::objects::managed_selector;
use futures::{Future, StreamExt};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    runtime::{
        reflector::{self, Store},
        watcher, WatchStreamExt,
    },
    Api, Client, Resource,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, warn};

/// A store of the fleet-managed `K` objects in `namespace`, plus the future that keeps it
/// filled. The store is empty until that future runs; see [`Store::wait_until_ready`].
pub fn managed_store<K>(
    client: Client,
    namespace: &str,
) -> (Store<K>, impl Future<Output = ()> + Send + 'static)
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
    <K as Resource>::DynamicType: Default + Eq + Hash + Clone + Send + Sync,
{
    let api: Api<K> = Api::namespaced(client, namespace);
    let config = watcher::Config::default().labels(&managed_selector());
    let (store, writer) = reflector::store();
    let kind = K::kind(&Default::default()).to_string();

    let driver = reflector::reflector(writer, watcher(api, config))
        .default_backoff()
        .touched_objects()
        .for_each(move |event| {
            match event {
                Ok(obj) => debug!("Cache saw {} {:?}", kind, obj.meta().name),
                Err(e) => warn!("Watch error for {}: {}", kind, e),
            }
            futures::future::ready(())
        });

    (store, driver)
}
