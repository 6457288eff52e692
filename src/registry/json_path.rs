// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Dotted-path lookups into registry JSON responses.

use crate::error::{FleetSyncError, Result};
use serde_json::Value;

/// Walk `path` ("labels.k8sApiHost") through nested objects
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }
    path.split('.').try_fold(doc, |node, segment| node.get(segment))
}

/// String at `path`, or `default` when absent, null or not a string
pub fn string_or(doc: &Value, path: &str, default: &str) -> String {
    lookup(doc, path)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// String at `path` that the registry must always send
pub fn required_str<'a>(doc: &'a Value, path: &str) -> Result<&'a str> {
    lookup(doc, path).and_then(Value::as_str).ok_or_else(|| {
        FleetSyncError::RegistryProtocol(format!("missing string field '{}'", path))
    })
}

/// Elements of the array at `path` that the registry must always send
pub fn required_array<'a>(doc: &'a Value, path: &str) -> Result<&'a [Value]> {
    lookup(doc, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| FleetSyncError::RegistryProtocol(format!("missing array field '{}'", path)))
}
