// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster registry client: connection settings, retrying HTTP transport and response parsing.

pub mod clusters;
pub mod connection;
pub mod http;
pub mod json_path;
pub mod retry;

pub use clusters::list_clusters;
pub use connection::{ConnectionConfig, ConnectionSnapshot};
pub use http::{HttpRegistryApi, RegistryApi};
pub use retry::RetryPolicy;
