// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and the local object caches.

pub mod cache;
pub mod crd;

pub use cache::managed_store;
pub use crd::wait_for_managed_cluster_crd;
