// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Structural comparison of an existing object against the state fleetsync wants.

use serde::Serialize;
use serde_json::Value;

/// Paths at which `existing` differs from `desired`.
///
/// Fields that are empty, zero or absent on the desired side are skipped, so server-populated
/// or foreign fields on the existing object never count as a difference. Values are not
/// included in the result since secrets are compared too.
pub fn compare_ignore_target_empties<T: Serialize>(existing: &T, desired: &T) -> Vec<String> {
    let (Ok(existing), Ok(desired)) = (serde_json::to_value(existing), serde_json::to_value(desired)) else {
        return vec!["<unserializable>".to_string()];
    };
    let mut diffs = Vec::new();
    diff_values("", &existing, &desired, &mut diffs);
    diffs
}

fn diff_values(path: &str, existing: &Value, desired: &Value, diffs: &mut Vec<String>) {
    if is_empty(desired) {
        return;
    }

    match (existing, desired) {
        (Value::Object(existing), Value::Object(desired)) => {
            for (key, desired_value) in desired {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                diff_values(&child, existing.get(key).unwrap_or(&Value::Null), desired_value, diffs);
            }
        }
        (Value::Array(existing), Value::Array(desired)) if existing.len() == desired.len() => {
            for (i, (e, d)) in existing.iter().zip(desired).enumerate() {
                diff_values(&format!("{}[{}]", path, i), e, d, diffs);
            }
        }
        _ if existing != desired => diffs.push(path.to_string()),
        _ => {}
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_values_have_no_diff() {
        let value = json!({"spec": {"serverAddress": "1.2.3.4:6443", "type": "oke"}});
        assert!(compare_ignore_target_empties(&value, &value).is_empty());
    }

    #[test]
    fn test_extra_existing_fields_are_ignored() {
        let existing = json!({
            "metadata": {"name": "a", "resourceVersion": "42", "uid": "u-1", "labels": {"x": "y", "k8s-app": "v"}},
            "spec": {"type": "oke"}
        });
        let desired = json!({"metadata": {"name": "a", "labels": {"k8s-app": "v"}}, "spec": {"type": "oke"}});

        assert!(compare_ignore_target_empties(&existing, &desired).is_empty());
    }

    #[test]
    fn test_empty_desired_fields_are_ignored() {
        let existing = json!({"spec": {"serverAddress": "1.2.3.4:6443", "type": "oke", "replicas": 3}});
        let desired = json!({"spec": {"serverAddress": "1.2.3.4:6443", "type": "", "replicas": 0, "extra": null}});

        assert!(compare_ignore_target_empties(&existing, &desired).is_empty());
    }

    #[test]
    fn test_changed_field_is_reported_by_path() {
        let existing = json!({"spec": {"serverAddress": "1.2.3.4:6443", "type": "oke"}});
        let desired = json!({"spec": {"serverAddress": "5.6.7.8:6443", "type": "oke"}});

        assert_eq!(compare_ignore_target_empties(&existing, &desired), vec!["spec.serverAddress"]);
    }

    #[test]
    fn test_missing_existing_field_is_reported() {
        let existing = json!({"data": {}});
        let desired = json!({"data": {"kubeconfig": "a2M="}});

        assert_eq!(compare_ignore_target_empties(&existing, &desired), vec!["data.kubeconfig"]);
    }

    #[test]
    fn test_array_length_change_is_reported() {
        let existing = json!({"items": [1, 2]});
        let desired = json!({"items": [1, 2, 3]});

        assert_eq!(compare_ignore_target_empties(&existing, &desired), vec!["items"]);
    }

    #[test]
    fn test_array_element_change_is_reported_with_index() {
        let existing = json!({"items": [{"a": 1}, {"a": 2}]});
        let desired = json!({"items": [{"a": 1}, {"a": 5}]});

        assert_eq!(compare_ignore_target_empties(&existing, &desired), vec!["items[1].a"]);
    }
}
