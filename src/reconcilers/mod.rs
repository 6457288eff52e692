// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod ca_secret;

pub use ca_secret::{fetch_ca_certificate, CaSecretReconciler};
