// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{naming, POLL_INTERVAL_SECS};
use crate::error::{FleetSyncError, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the cluster registry
    pub registry_url: Url,
    pub registry_username: String,
    pub registry_password: String,
    /// Address to connect to instead of the URL's host, for environments without external DNS
    pub registry_host: Option<String>,
    /// Namespace managed cluster records and secrets are written to
    pub target_namespace: String,
    pub poll_interval: Duration,
    /// Delete records for clusters the registry no longer reports
    pub prune_removed_clusters: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| FleetSyncError::Configuration(format!("{} environment variable not set", key)))
        };

        let raw_url = required("REGISTRY_URL")?;
        let registry_url = Url::parse(raw_url.trim_end_matches('/')).map_err(|e| {
            FleetSyncError::Configuration(format!("Invalid REGISTRY_URL '{}': {}", raw_url, e))
        })?;
        if registry_url.host_str().is_none() {
            return Err(FleetSyncError::Configuration(format!(
                "REGISTRY_URL '{}' has no host",
                raw_url
            )));
        }

        let registry_username = required("REGISTRY_USERNAME")?;
        let registry_password = required("REGISTRY_PASSWORD")?;
        let registry_host = lookup("REGISTRY_HOST").filter(|v| !v.is_empty());
        let target_namespace = lookup("TARGET_NAMESPACE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| naming::DEFAULT_NAMESPACE.to_string());

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(v) => {
                let secs: u64 = v.parse().map_err(|e| {
                    FleetSyncError::Configuration(format!("Invalid POLL_INTERVAL_SECS '{}': {}", v, e))
                })?;
                if secs == 0 {
                    return Err(FleetSyncError::Configuration(
                        "POLL_INTERVAL_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(POLL_INTERVAL_SECS),
        };

        let prune_removed_clusters = match lookup("PRUNE_REMOVED_CLUSTERS") {
            Some(v) => v.parse().map_err(|e| {
                FleetSyncError::Configuration(format!("Invalid PRUNE_REMOVED_CLUSTERS '{}': {}", v, e))
            })?,
            None => false,
        };

        Ok(Config {
            registry_url,
            registry_username,
            registry_password,
            registry_host,
            target_namespace,
            poll_interval,
            prune_removed_clusters,
        })
    }
}
