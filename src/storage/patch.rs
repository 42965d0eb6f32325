//! Pod spec patches
//!
//! A patch starts as a copy of the first container and the pod volumes of a
//! target spec. Builders only ever append to it, and the merge step then
//! writes the assembled lists back over the target.

use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, PodSpec, SecretKeySelector, SecretVolumeSource, Volume,
    VolumeMount,
};

use crate::error::MergeError;

/// Additions for a single container and its pod
#[derive(Debug, Clone, PartialEq)]
pub struct PodSpecPatch {
    /// Copy of the target container with appended env, mounts and args
    pub container: Container,
    /// Copy of the target pod volumes with appended volumes
    pub volumes: Vec<Volume>,
}

impl PodSpecPatch {
    /// Seed a patch from the first container of `pod_spec`
    ///
    /// Works on clones, the caller's spec stays untouched until merge.
    pub fn from_pod_spec(pod_spec: &PodSpec) -> Result<Self, MergeError> {
        let container = pod_spec
            .containers
            .first()
            .cloned()
            .ok_or(MergeError::MissingContainer)?;

        Ok(Self {
            container,
            volumes: pod_spec.volumes.clone().unwrap_or_default(),
        })
    }

    pub fn push_volume(&mut self, volume: Volume) {
        self.volumes.push(volume);
    }

    pub fn push_volume_mount(&mut self, mount: VolumeMount) {
        self.container
            .volume_mounts
            .get_or_insert_with(Vec::new)
            .push(mount);
    }

    pub fn extend_env(&mut self, env: impl IntoIterator<Item = EnvVar>) {
        self.container.env.get_or_insert_with(Vec::new).extend(env);
    }

    pub fn push_arg(&mut self, arg: String) {
        self.container.args.get_or_insert_with(Vec::new).push(arg);
    }

    /// Partial pod spec holding only the patched container and volume list
    pub fn into_pod_spec(self) -> PodSpec {
        PodSpec {
            containers: vec![self.container],
            volumes: Some(self.volumes),
            ..Default::default()
        }
    }
}

/// Env var resolved from a secret key at pod start
pub fn env_var_from_secret(name: &str, secret_name: &str, secret_key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: Some(secret_name.to_string()),
                key: secret_key.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Env var with a literal value
pub fn env_var_from_value(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.into()),
        ..Default::default()
    }
}

/// Volume backed by a secret of the same name
pub fn secret_volume(secret_name: &str) -> Volume {
    Volume {
        name: secret_name.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(secret_name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pod_spec() -> PodSpec {
        PodSpec {
            containers: vec![
                Container {
                    name: "ingester".into(),
                    args: Some(vec!["-target=ingester".into()]),
                    ..Default::default()
                },
                Container {
                    name: "sidecar".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_copies_first_container() {
        let spec = pod_spec();
        let patch = PodSpecPatch::from_pod_spec(&spec).unwrap();

        assert_eq!(patch.container.name, "ingester");
        assert!(patch.volumes.is_empty());
    }

    #[test]
    fn test_seed_requires_container() {
        let result = PodSpecPatch::from_pod_spec(&PodSpec::default());
        assert_matches!(result, Err(MergeError::MissingContainer));
    }

    #[test]
    fn test_appending_does_not_alias_source() {
        let spec = pod_spec();
        let mut patch = PodSpecPatch::from_pod_spec(&spec).unwrap();

        patch.push_arg("-s3.http.ca-file=/etc/storage/ca/ca.crt".into());
        patch.extend_env([env_var_from_value("A", "1")]);
        patch.push_volume(secret_volume("creds"));

        assert_eq!(spec.containers[0].args.as_ref().unwrap().len(), 1);
        assert!(spec.containers[0].env.is_none());
        assert!(spec.volumes.is_none());

        let out = patch.into_pod_spec();
        assert_eq!(out.containers.len(), 1);
        assert_eq!(out.containers[0].args.as_ref().unwrap().len(), 2);
        assert_eq!(out.volumes.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_env_var_from_secret() {
        let env = env_var_from_secret("AWS_ACCESS_KEY_ID", "creds", "access_key_id");
        assert!(env.value.is_none());

        let selector = env.value_from.unwrap().secret_key_ref.unwrap();
        assert_eq!(selector.name.as_deref(), Some("creds"));
        assert_eq!(selector.key, "access_key_id");
    }
}
