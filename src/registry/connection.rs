// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry connection settings shared between the poll loop and the CA reload controller.

use crate::config::Config;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use url::Url;

/// Registry endpoint, credentials and trusted CA.
///
/// Cloning is cheap and all clones share the same CA slot. The CA bytes are the only
/// mutable part; they are swapped as a whole so readers never see a partial value.
#[derive(Clone)]
pub struct ConnectionConfig {
    inner: Arc<Inner>,
}

struct Inner {
    url: Url,
    username: String,
    password: String,
    host: Option<String>,
    ca_certificate: RwLock<Arc<[u8]>>,
}

/// A consistent view of the connection settings for a single registry call
#[derive(Clone)]
pub struct ConnectionSnapshot {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub host: Option<String>,
    /// PEM bytes, empty when only the system roots are trusted
    pub ca_certificate: Arc<[u8]>,
}

impl ConnectionConfig {
    pub fn new(
        url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
        host: Option<String>,
        ca_certificate: Vec<u8>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                url,
                username: username.into(),
                password: password.into(),
                host,
                ca_certificate: RwLock::new(Arc::from(ca_certificate)),
            }),
        }
    }

    pub fn from_config(config: &Config, ca_certificate: Vec<u8>) -> Self {
        Self::new(
            config.registry_url.clone(),
            config.registry_username.clone(),
            config.registry_password.clone(),
            config.registry_host.clone(),
            ca_certificate,
        )
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn ca_certificate(&self) -> Arc<[u8]> {
        self.inner
            .ca_certificate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            url: self.inner.url.clone(),
            username: self.inner.username.clone(),
            password: self.inner.password.clone(),
            host: self.inner.host.clone(),
            ca_certificate: self.ca_certificate(),
        }
    }

    /// Replace the trusted CA unless it already holds exactly these bytes.
    /// Returns whether the value changed.
    pub fn replace_ca_if_changed(&self, ca_certificate: &[u8]) -> bool {
        let mut current = self
            .inner
            .ca_certificate
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if current.as_ref() == ca_certificate {
            return false;
        }
        *current = Arc::from(ca_certificate);
        true
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.inner.url.as_str())
            .field("username", &self.inner.username)
            .field("host", &self.inner.host)
            .field("ca_certificate_len", &self.ca_certificate().len())
            .finish_non_exhaustive()
    }
}
