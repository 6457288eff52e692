// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetSyncError {
    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Registry protocol error: {0}")]
    RegistryProtocol(String),

    #[error("Object conflict: {0}")]
    ObjectConflict(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),
}

impl FleetSyncError {
    /// Classify a failed write against the API server for the object `what`
    pub fn from_write(what: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 409 => {
                FleetSyncError::ObjectConflict(format!("{}: {}", what, resp.message))
            }
            kube::Error::Api(resp) if resp.code == 404 => {
                FleetSyncError::ObjectNotFound(format!("{}: {}", what, resp.message))
            }
            other => FleetSyncError::KubeError(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FleetSyncError>;
