//! Custom CA for S3 endpoints

use k8s_openapi::api::core::v1::{ConfigMapVolumeSource, Volume, VolumeMount};
use tracing::debug;

use super::options::TlsConfig;
use super::patch::PodSpecPatch;
use super::vars::{join_path, CA_DIRECTORY, STORAGE_TLS_VOLUME};

/// Mount the CA config map and point the S3 client at the bundle
pub fn ensure_ca_for_s3(mut patch: PodSpecPatch, tls: &TlsConfig) -> PodSpecPatch {
    patch.push_volume(Volume {
        name: STORAGE_TLS_VOLUME.to_string(),
        config_map: Some(ConfigMapVolumeSource {
            name: Some(tls.ca.clone()),
            ..Default::default()
        }),
        ..Default::default()
    });

    patch.push_volume_mount(VolumeMount {
        name: STORAGE_TLS_VOLUME.to_string(),
        read_only: Some(false),
        mount_path: CA_DIRECTORY.to_string(),
        ..Default::default()
    });

    let ca_file = join_path(CA_DIRECTORY, &tls.key);
    debug!(config_map = %tls.ca, ca_file = %ca_file, "Prepared object storage CA patch");
    patch.push_arg(format!("-s3.http.ca-file={}", ca_file));

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{Container, PodSpec};

    fn tls() -> TlsConfig {
        TlsConfig {
            ca: "test-ca".into(),
            key: "service-ca.crt".into(),
        }
    }

    #[test]
    fn test_ca_patch_adds_volume_mount_and_arg() {
        let spec = PodSpec {
            containers: vec![Container {
                name: "loki-compactor".into(),
                args: Some(vec!["-target=compactor".into()]),
                ..Default::default()
            }],
            ..Default::default()
        };

        let patch = ensure_ca_for_s3(PodSpecPatch::from_pod_spec(&spec).unwrap(), &tls());

        assert_eq!(patch.volumes.len(), 1);
        assert_eq!(patch.volumes[0].name, "storage-tls");
        assert_eq!(
            patch.volumes[0].config_map.as_ref().unwrap().name.as_deref(),
            Some("test-ca")
        );

        let mounts = patch.container.volume_mounts.as_ref().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_path, "/etc/storage/ca");
        assert_eq!(mounts[0].read_only, Some(false));

        assert_eq!(
            patch.container.args,
            Some(vec![
                "-target=compactor".to_string(),
                "-s3.http.ca-file=/etc/storage/ca/service-ca.crt".to_string(),
            ])
        );
    }

    #[test]
    fn test_ca_file_arg_uses_cleaned_path() {
        let spec = PodSpec {
            containers: vec![Container {
                name: "loki-querier".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let tls = TlsConfig {
            ca: "test-ca".into(),
            key: "./ca.crt".into(),
        };

        let patch = ensure_ca_for_s3(PodSpecPatch::from_pod_spec(&spec).unwrap(), &tls);

        assert_eq!(
            patch.container.args,
            Some(vec!["-s3.http.ca-file=/etc/storage/ca/ca.crt".to_string()])
        );
    }
}
