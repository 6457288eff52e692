// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types: the local managed cluster record and the registry's cluster descriptor.

pub mod managed_cluster;
pub mod remote_cluster;

pub use managed_cluster::{VerrazzanoManagedCluster, VerrazzanoManagedClusterSpec};
pub use remote_cluster::RemoteCluster;
