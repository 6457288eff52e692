// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API and registry responses.

use crate::constants::registry as api;
use crate::error::{FleetSyncError, Result};
use crate::registry::RegistryApi;
use http::{Method, Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::{Client, Resource};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request seen by [`MockService`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Unmatched writes succeed: POST and PUT echo the request body, DELETE returns a
/// success status. Unmatched GETs are 404. Every request is recorded.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests that would mutate state on the API server
    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| matches!(r.method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE"))
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Prefix match for paths like /api/v1/namespaces/foo/secrets/bar
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            let body: Option<Value> = serde_json::from_slice(&bytes).ok();
            requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path,
                body: body.clone(),
            });

            let (status, body) = match (response, method.as_str()) {
                (Some(resp), _) => resp,
                (None, "POST") => (201, body.map(|b| b.to_string()).unwrap_or_default()),
                (None, "PUT") => (200, body.map(|b| b.to_string()).unwrap_or_default()),
                (None, "DELETE") => (200, success_json()),
                (None, _) => (404, not_found_json("object", "unknown")),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

fn success_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Success",
        "code": 200,
        "message": "",
        "reason": ""
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a 409 conflict response
pub fn conflict_json(name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("\"{}\" already exists", name),
        "reason": "AlreadyExists",
        "code": 409
    })
    .to_string()
}

/// `obj` as the API server would return it after persisting
pub fn stored<K: Resource>(mut obj: K) -> K {
    let meta = obj.meta_mut();
    meta.resource_version = Some("1".to_string());
    meta.uid = Some(format!("uid-{}", meta.name.clone().unwrap_or_default()));
    obj
}

const THREE_CLUSTERS: &str = r#"{
  "type": "collection",
  "data": [
    {
      "id": "c-ndvgb",
      "name": "foo-managed-1",
      "labels": {"k8sApiHost": "130.35.130.66", "k8sApiPort": "6443", "type": "oke"}
    },
    {
      "id": "c-r998z",
      "name": "foo-managed-2",
      "labels": {"k8sApiHost": "147.154.97.197", "k8sApiPort": "6443", "type": "oke"}
    },
    {
      "id": "local",
      "name": "local",
      "labels": {"k8sApiHost": "147.154.96.26", "k8sApiPort": "6443", "type": "oke"}
    }
  ]
}"#;

/// In-memory registry serving a fixed cluster list and generated kubeconfigs
#[derive(Clone)]
pub struct FixtureRegistry {
    clusters: String,
    unavailable: bool,
    failing_kubeconfigs: Vec<String>,
    calls: Arc<Mutex<Vec<(Method, String)>>>,
}

impl FixtureRegistry {
    pub fn new(clusters: &str) -> Self {
        Self {
            clusters: clusters.to_string(),
            unavailable: false,
            failing_kubeconfigs: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn three_clusters() -> Self {
        Self::new(THREE_CLUSTERS)
    }

    /// A registry answering every call with a failure
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(THREE_CLUSTERS)
        }
    }

    pub fn failing_kubeconfig_for(mut self, cluster_id: &str) -> Self {
        self.failing_kubeconfigs.push(cluster_id.to_string());
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<(Method, String)>>> {
        self.calls.clone()
    }

    fn respond(&self, method: &Method, path: &str) -> Result<Value> {
        if self.unavailable {
            return Err(FleetSyncError::RegistryUnavailable(format!(
                "{} {}: status 503",
                method, path
            )));
        }

        if *method == Method::GET && path == api::CLUSTERS_PATH {
            return serde_json::from_str(&self.clusters)
                .map_err(|e| FleetSyncError::RegistryProtocol(e.to_string()));
        }

        let prefix = format!("{}/", api::CLUSTERS_PATH);
        match path.strip_prefix(&prefix) {
            Some(id) if *method == Method::POST => {
                if self.failing_kubeconfigs.iter().any(|f| f == id) {
                    return Err(FleetSyncError::RegistryUnavailable(format!(
                        "{} {}: status 500",
                        method, path
                    )));
                }
                Ok(serde_json::json!({ "config": format!("generatedKubeConfigOutput:{}", id) }))
            }
            _ => Err(FleetSyncError::RegistryUnavailable(format!(
                "{} {}: status 404",
                method, path
            ))),
        }
    }
}

impl RegistryApi for FixtureRegistry {
    fn api_call(
        &self,
        method: Method,
        path: &str,
        _query: &[(&str, &str)],
        _payload: Option<&str>,
    ) -> impl Future<Output = Result<Value>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((method.clone(), path.to_string()));
        std::future::ready(self.respond(&method, path))
    }
}
