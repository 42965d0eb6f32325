//! Structural pod spec merge
//!
//! Deep-merges a patch into a target with the patch winning:
//! - objects merge key by key
//! - arrays and scalars from the patch replace the target's
//! - empty patch values (null, false, 0, "", [], {}) never override
//!
//! Both sides go through `serde_json::Value`, so a mismatch between JSON kinds
//! is reported instead of silently dropped.

use k8s_openapi::api::core::v1::PodSpec;
use serde_json::{Map, Value};

use crate::error::MergeError;

/// Merge `patch` into `target`
///
/// `target` is only replaced once the whole merge succeeded.
pub fn merge_pod_spec(target: &mut PodSpec, patch: PodSpec) -> Result<(), MergeError> {
    let mut merged = serde_json::to_value(&*target)?;
    let patch = serde_json::to_value(patch)?;

    merge_values(&mut merged, patch, "spec")?;

    *target = serde_json::from_value(merged)?;
    Ok(())
}

fn merge_values(dst: &mut Value, src: Value, path: &str) -> Result<(), MergeError> {
    if is_empty_value(&src) {
        return Ok(());
    }

    match src {
        Value::Object(src_fields) => match dst {
            Value::Object(dst_fields) => merge_objects(dst_fields, src_fields, path),
            Value::Null => {
                *dst = Value::Object(src_fields);
                Ok(())
            }
            other => Err(MergeError::TypeMismatch {
                path: path.to_string(),
                source_kind: "object",
                target_kind: kind_of(other),
            }),
        },
        src if dst.is_null() || kind_of(dst) == kind_of(&src) => {
            *dst = src;
            Ok(())
        }
        src => Err(MergeError::TypeMismatch {
            path: path.to_string(),
            source_kind: kind_of(&src),
            target_kind: kind_of(dst),
        }),
    }
}

fn merge_objects(
    dst: &mut Map<String, Value>,
    src: Map<String, Value>,
    path: &str,
) -> Result<(), MergeError> {
    for (key, value) in src {
        let child_path = format!("{}.{}", path, key);
        match dst.get_mut(&key) {
            Some(existing) => merge_values(existing, value, &child_path)?,
            None if !is_empty_value(&value) => {
                dst.insert(key, value);
            }
            None => {}
        }
    }
    Ok(())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use k8s_openapi::api::core::v1::{Container, Volume};
    use serde_json::json;

    fn container(name: &str, args: &[&str]) -> Container {
        Container {
            name: name.into(),
            args: Some(args.iter().map(|a| a.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_patch_replaces_container_and_volumes() {
        let mut target = PodSpec {
            containers: vec![container("loki", &["-target=ingester"])],
            service_account_name: Some("loki".into()),
            termination_grace_period_seconds: Some(300),
            ..Default::default()
        };
        let patch = PodSpec {
            containers: vec![container("loki", &["-target=ingester", "-s3.http.ca-file=/ca"])],
            volumes: Some(vec![Volume {
                name: "storage-tls".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };

        merge_pod_spec(&mut target, patch.clone()).unwrap();

        assert_eq!(target.containers, patch.containers);
        assert_eq!(target.volumes, patch.volumes);
        assert_eq!(target.service_account_name.as_deref(), Some("loki"));
        assert_eq!(target.termination_grace_period_seconds, Some(300));
    }

    #[test]
    fn test_empty_patch_values_do_not_override() {
        let mut dst = json!({"a": "keep", "b": true, "c": 3, "d": [1], "e": {"f": "x"}});
        let src = json!({"a": "", "b": false, "c": 0, "d": [], "e": {}, "g": null});

        merge_values(&mut dst, src, "spec").unwrap();

        assert_eq!(dst, json!({"a": "keep", "b": true, "c": 3, "d": [1], "e": {"f": "x"}}));
    }

    #[test]
    fn test_nested_objects_merge() {
        let mut dst = json!({"securityContext": {"runAsUser": 10001, "fsGroup": 10001}});
        let src = json!({"securityContext": {"runAsUser": 1000}, "hostNetwork": true});

        merge_values(&mut dst, src, "spec").unwrap();

        assert_eq!(
            dst,
            json!({
                "securityContext": {"runAsUser": 1000, "fsGroup": 10001},
                "hostNetwork": true
            })
        );
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut dst = json!({"volumes": {"name": "oops"}});
        let src = json!({"volumes": [{"name": "creds"}]});

        let err = merge_values(&mut dst, src, "spec").unwrap_err();
        assert_matches!(
            err,
            MergeError::TypeMismatch { ref path, source_kind: "array", target_kind: "object" }
                if path == "spec.volumes"
        );
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut target = PodSpec {
            containers: vec![container("loki", &["-target=querier"])],
            node_selector: Some([("zone".to_string(), "a".to_string())].into()),
            ..Default::default()
        };
        let before = target.clone();

        merge_pod_spec(&mut target, PodSpec::default()).unwrap();
        assert_eq!(target, before);
    }
}
