// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for registry calls.

use crate::constants::http as transport;
use crate::error::{FleetSyncError, Result};
use crate::registry::connection::{ConnectionConfig, ConnectionSnapshot};
use crate::registry::retry::{retry_with_backoff, RetryPolicy};
use http::header::{ACCEPT, CONTENT_TYPE, HOST};
use http::{Method, StatusCode};
use reqwest::{Certificate, Client, Proxy};
use serde_json::Value;
use std::env;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

/// A single call against the registry REST API, returning the parsed JSON body
pub trait RegistryApi {
    fn api_call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<&str>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Registry client talking HTTP(S), retrying every call per its [`RetryPolicy`]
#[derive(Clone, Debug)]
pub struct HttpRegistryApi {
    connection: ConnectionConfig,
    retry: RetryPolicy,
    proxy: Option<String>,
    response_header_timeout: Duration,
    cancel: CancellationToken,
}

impl HttpRegistryApi {
    /// Create a client using the proxy configured in the environment
    pub fn new(connection: ConnectionConfig, retry: RetryPolicy, cancel: CancellationToken) -> Self {
        Self {
            connection,
            retry,
            proxy: proxy_from_env(|key| env::var(key).ok()),
            response_header_timeout: transport::RESPONSE_HEADER_TIMEOUT,
            cancel,
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_response_header_timeout(mut self, timeout: Duration) -> Self {
        self.response_header_timeout = timeout;
        self
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<&str>,
    ) -> Result<String> {
        let conn = self.connection.snapshot();
        let host_override = resolve_host_override(&conn).await?;
        let client = self.build_client(&conn, host_override.as_ref())?;
        let target = target_url(&conn.url, host_override.as_ref())?;
        let url = format!("{}{}", target.as_str().trim_end_matches('/'), path);

        let mut request = client
            .request(method.clone(), &url)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, "application/json")
            .query(query);
        if !conn.username.is_empty() && !conn.password.is_empty() {
            request = request.basic_auth(&conn.username, Some(&conn.password));
        }
        if let Some(payload) = payload {
            request = request.body(payload.to_string());
        }
        if let Some(authority) = host_header(&conn.url, host_override.as_ref()) {
            request = request.header(HOST, authority);
        }

        // send() resolves once the response headers are in
        let response = tokio::time::timeout(self.response_header_timeout, request.send())
            .await
            .map_err(|_| {
                FleetSyncError::RegistryUnavailable(format!(
                    "{} {}: no response headers within {}s",
                    method,
                    url,
                    self.response_header_timeout.as_secs_f64()
                ))
            })?
            .map_err(|e| FleetSyncError::RegistryUnavailable(format!("{} {}: {}", method, url, e)))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            FleetSyncError::RegistryUnavailable(format!("{} {}: reading body: {}", method, url, e))
        })?;

        if status != StatusCode::OK {
            return Err(FleetSyncError::RegistryUnavailable(format!(
                "expected response code {} from {} {} but got {}",
                StatusCode::OK.as_u16(),
                method,
                url,
                status.as_u16()
            )));
        }

        Ok(body)
    }

    fn build_client(&self, conn: &ConnectionSnapshot, host_override: Option<&HostOverride>) -> Result<Client> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .connect_timeout(transport::CONNECT_TIMEOUT)
            .timeout(transport::REQUEST_TIMEOUT)
            .no_proxy();

        if !conn.ca_certificate.is_empty() {
            let certs = Certificate::from_pem_bundle(&conn.ca_certificate).map_err(|e| {
                FleetSyncError::Configuration(format!("Invalid registry CA certificate: {}", e))
            })?;
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        if let Some(proxy) = &self.proxy {
            let proxy = Proxy::all(proxy.as_str()).map_err(|e| {
                FleetSyncError::Configuration(format!("Invalid proxy URL '{}': {}", proxy, e))
            })?;
            builder = builder.proxy(proxy);
        }

        // The URL's host is kept for SNI and certificate checks, only the socket target changes
        if let Some(o) = host_override {
            debug!("Connecting to {} via {:?}", o.host, o.addrs);
            builder = builder.resolve_to_addrs(&o.host, &o.addrs);
        }

        builder
            .build()
            .map_err(|e| FleetSyncError::Configuration(format!("Failed to build HTTP client: {}", e)))
    }
}

impl RegistryApi for HttpRegistryApi {
    #[instrument(skip(self, query, payload), fields(url = %self.connection.url()))]
    async fn api_call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Option<&str>,
    ) -> Result<Value> {
        debug!("[{}] {}", method, path);

        let operation = format!("{} {}", method, path);
        let body = retry_with_backoff(&self.retry, &operation, &self.cancel, || {
            self.send_once(&method, path, query, payload)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| {
            FleetSyncError::RegistryProtocol(format!("unable to parse response body of {} as JSON: {}", operation, e))
        })
    }
}

/// First non-empty proxy variable, HTTPS before HTTP and lower case before upper case
pub fn proxy_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    transport::PROXY_ENV_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

/// Split "host", "host:port", "1.2.3.4:443" or "[::1]:443" into host and optional port
fn split_host_port(value: &str) -> (String, Option<u16>) {
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return (addr.ip().to_string(), Some(addr.port()));
    }
    match value.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host.to_string(), Some(port)),
            Err(_) => (value.to_string(), None),
        },
        _ => (value.trim_start_matches('[').trim_end_matches(']').to_string(), None),
    }
}

/// Where to connect instead of the URL's host. The URL's host still names the TLS peer.
#[derive(Debug, PartialEq)]
struct HostOverride {
    /// Host of the registry URL
    host: String,
    /// Port to dial
    port: u16,
    addrs: Vec<SocketAddr>,
}

/// The override to apply, when one is configured and differs from the URL's host
async fn resolve_host_override(conn: &ConnectionSnapshot) -> Result<Option<HostOverride>> {
    let Some(override_value) = conn.host.as_deref().filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let Some(url_host) = conn.url.host_str() else {
        return Ok(None);
    };

    let (override_host, override_port) = split_host_port(override_value);
    if override_host == url_host {
        return Ok(None);
    }

    let port = override_port
        .or_else(|| conn.url.port_or_known_default())
        .unwrap_or(443);
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((override_host.as_str(), port))
        .await
        .map_err(|e| {
            FleetSyncError::RegistryUnavailable(format!(
                "Failed to resolve registry host override '{}': {}",
                override_value, e
            ))
        })?
        .collect();

    if addrs.is_empty() {
        return Err(FleetSyncError::RegistryUnavailable(format!(
            "Registry host override '{}' resolved to no addresses",
            override_value
        )));
    }

    Ok(Some(HostOverride {
        host: url_host.to_string(),
        port,
        addrs,
    }))
}

/// The registry URL with its port replaced by the override's.
///
/// reqwest dials the port of the request URL, whatever the resolved addresses carry.
fn target_url(url: &Url, host_override: Option<&HostOverride>) -> Result<Url> {
    let mut target = url.clone();
    if let Some(o) = host_override {
        if url.port_or_known_default() != Some(o.port) {
            target.set_port(Some(o.port)).map_err(|_| {
                FleetSyncError::Configuration(format!("Cannot set port {} on registry URL '{}'", o.port, url))
            })?;
        }
    }
    Ok(target)
}

/// The original authority, sent when the dialed port differs from the URL's
fn host_header(url: &Url, host_override: Option<&HostOverride>) -> Option<String> {
    let o = host_override?;
    if url.port_or_known_default() == Some(o.port) {
        return None;
    }
    Some(match url.port() {
        Some(port) => format!("{}:{}", o.host, port),
        None => o.host.clone(),
    })
}
