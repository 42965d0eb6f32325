//! Object storage options
//!
//! Resolved storage configuration handed in by the reconciler. Everything
//! here is already defaulted and validated upstream; the patching code only
//! reads it.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::Error;

// =============================================================================
// Storage Type
// =============================================================================

/// Object storage backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStorageType {
    Azure,
    Gcs,
    S3,
    Swift,
    #[serde(rename = "alibabacloud")]
    AlibabaCloud,
}

impl std::fmt::Display for ObjectStorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectStorageType::Azure => write!(f, "azure"),
            ObjectStorageType::Gcs => write!(f, "gcs"),
            ObjectStorageType::S3 => write!(f, "s3"),
            ObjectStorageType::Swift => write!(f, "swift"),
            ObjectStorageType::AlibabaCloud => write!(f, "alibabacloud"),
        }
    }
}

impl FromStr for ObjectStorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(ObjectStorageType::Azure),
            "gcs" => Ok(ObjectStorageType::Gcs),
            "s3" => Ok(ObjectStorageType::S3),
            "swift" => Ok(ObjectStorageType::Swift),
            "alibabacloud" => Ok(ObjectStorageType::AlibabaCloud),
            _ => Err(Error::UnknownStorageType(s.to_string())),
        }
    }
}

/// Empty and `none` mean no backend; other names must be known types
fn deserialize_shared_store<'de, D>(deserializer: D) -> Result<Option<ObjectStorageType>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    match name.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) if name.eq_ignore_ascii_case("none") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// How the workload authenticates against the object store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// Long-lived keys read from the storage secret
    Static,
    /// Short-lived projected service account token (STS / workload identity)
    Token,
    /// Token flow with credentials rotated by the platform's cloud credential operator
    TokenCco,
}

impl std::fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialMode::Static => write!(f, "static"),
            CredentialMode::Token => write!(f, "token"),
            CredentialMode::TokenCco => write!(f, "token-cco"),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Storage options for configuring a workload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Backend kind; `None` leaves workloads untouched
    #[serde(default, deserialize_with = "deserialize_shared_store")]
    #[schemars(with = "Option<ObjectStorageType>")]
    pub shared_store: Option<ObjectStorageType>,

    /// Name of the secret holding the backend credentials
    #[serde(default)]
    pub secret_name: String,

    #[serde(default)]
    pub azure: Option<AzureStorageConfig>,

    #[serde(default)]
    pub gcs: Option<GcsStorageConfig>,

    #[serde(default)]
    pub s3: Option<S3StorageConfig>,

    #[serde(default)]
    pub swift: Option<SwiftStorageConfig>,

    #[serde(default)]
    pub alibaba_cloud: Option<AlibabaCloudStorageConfig>,

    /// Custom CA for the S3 endpoint
    #[serde(default)]
    pub tls: Option<TlsConfig>,

    #[serde(default)]
    pub open_shift: OpenShiftOptions,
}

impl Options {
    /// Whether the backend authenticates with a projected service account token
    pub fn managed_auth_enabled(&self) -> bool {
        match self.shared_store {
            Some(ObjectStorageType::S3) => self.s3.as_ref().is_some_and(|s3| s3.sts),
            Some(ObjectStorageType::Azure) => {
                self.azure.as_ref().is_some_and(|azure| azure.workload_identity)
            }
            Some(ObjectStorageType::Gcs)
            | Some(ObjectStorageType::Swift)
            | Some(ObjectStorageType::AlibabaCloud)
            | None => false,
        }
    }

    /// Credential delivery strategy for the configured backend
    pub fn credential_mode(&self) -> CredentialMode {
        if !self.managed_auth_enabled() {
            CredentialMode::Static
        } else if self.open_shift.managed_auth_enabled() {
            CredentialMode::TokenCco
        } else {
            CredentialMode::Token
        }
    }
}

// =============================================================================
// Backend Configurations
// =============================================================================

/// Azure blob storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureStorageConfig {
    #[serde(default)]
    pub env: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub endpoint_suffix: String,
    /// Overrides the default token audience when non-empty
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub workload_identity: bool,
}

/// Google Cloud Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcsStorageConfig {
    #[serde(default)]
    pub bucket: String,
}

/// S3 configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct S3StorageConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub buckets: String,
    /// Overrides the default token audience when non-empty
    #[serde(default)]
    pub audience: String,
    /// Use short-term security tokens instead of static keys
    #[serde(default)]
    pub sts: bool,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default)]
    pub sse: S3SseConfig,
}

/// S3 server-side encryption type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SseType {
    #[serde(rename = "SSE-KMS")]
    Kms,
    #[serde(rename = "SSE-S3")]
    S3,
}

/// S3 server-side encryption configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct S3SseConfig {
    #[serde(default, rename = "type")]
    pub sse_type: Option<SseType>,
    #[serde(default)]
    pub kms_key_id: String,
    #[serde(default)]
    pub kms_encryption_context: String,
}

/// OpenStack Swift configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwiftStorageConfig {
    #[serde(default)]
    pub auth_url: String,
    #[serde(default)]
    pub user_domain_name: String,
    #[serde(default)]
    pub user_domain_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub project_domain_id: String,
    #[serde(default)]
    pub project_domain_name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub container: String,
}

/// AlibabaCloud OSS configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlibabaCloudStorageConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub bucket: String,
}

/// Reference to a config map key holding a custom CA bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    /// Config map name
    pub ca: String,
    /// Key inside the config map
    pub key: String,
}

// =============================================================================
// Platform Options
// =============================================================================

/// OpenShift specific settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftOptions {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub cloud_credentials: CloudCredentials,
}

impl OpenShiftOptions {
    /// The platform manages authentication once the credentials request was fulfilled
    pub fn managed_auth_enabled(&self) -> bool {
        !self.cloud_credentials.secret_name.is_empty() && !self.cloud_credentials.sha1.is_empty()
    }
}

/// Secret provisioned by the platform's cloud credential operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloudCredentials {
    #[serde(default)]
    pub secret_name: String,
    #[serde(default)]
    pub sha1: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_options(sts: bool) -> Options {
        Options {
            shared_store: Some(ObjectStorageType::S3),
            secret_name: "test".into(),
            s3: Some(S3StorageConfig {
                sts,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_storage_type_round_trip_names() {
        for name in ["azure", "gcs", "s3", "swift", "alibabacloud"] {
            let parsed: ObjectStorageType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("minio".parse::<ObjectStorageType>().is_err());
    }

    #[test]
    fn test_managed_auth_only_for_s3_and_azure() {
        assert!(!s3_options(false).managed_auth_enabled());
        assert!(s3_options(true).managed_auth_enabled());

        let azure = Options {
            shared_store: Some(ObjectStorageType::Azure),
            azure: Some(AzureStorageConfig {
                workload_identity: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(azure.managed_auth_enabled());

        // s3 settings are ignored when another backend is selected
        let gcs = Options {
            shared_store: Some(ObjectStorageType::Gcs),
            ..s3_options(true)
        };
        assert!(!gcs.managed_auth_enabled());

        // missing backend section never enables the token flow
        let bare = Options {
            shared_store: Some(ObjectStorageType::S3),
            ..Default::default()
        };
        assert!(!bare.managed_auth_enabled());
    }

    #[test]
    fn test_credential_mode() {
        assert_eq!(s3_options(false).credential_mode(), CredentialMode::Static);
        assert_eq!(s3_options(true).credential_mode(), CredentialMode::Token);

        let mut opts = s3_options(true);
        opts.open_shift.cloud_credentials.secret_name = "cloud-credentials".into();
        // sha1 is only set once the credentials request is fulfilled
        assert_eq!(opts.credential_mode(), CredentialMode::Token);

        opts.open_shift.cloud_credentials.sha1 = "deadbeef".into();
        assert_eq!(opts.credential_mode(), CredentialMode::TokenCco);

        // platform credentials alone don't switch a static backend
        let mut opts = s3_options(false);
        opts.open_shift.cloud_credentials = opts_cco();
        assert_eq!(opts.credential_mode(), CredentialMode::Static);
    }

    fn opts_cco() -> CloudCredentials {
        CloudCredentials {
            secret_name: "cloud-credentials".into(),
            sha1: "deadbeef".into(),
        }
    }

    #[test]
    fn test_options_from_yaml() {
        let yaml = r#"
sharedStore: s3
secretName: creds
s3:
  sts: true
  audience: custom
  sse:
    type: SSE-KMS
    kmsEncryptionContext: '{"key":"value"}'
tls:
  ca: custom-ca
  key: ca.crt
"#;
        let opts: Options = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(opts.shared_store, Some(ObjectStorageType::S3));
        assert_eq!(opts.secret_name, "creds");
        let s3 = opts.s3.as_ref().unwrap();
        assert!(s3.sts);
        assert_eq!(s3.audience, "custom");
        assert_eq!(s3.sse.sse_type, Some(SseType::Kms));
        assert_eq!(opts.tls.as_ref().unwrap().key, "ca.crt");
        assert!(!opts.open_shift.enabled);
    }

    #[test]
    fn test_empty_and_none_backend_deserialize_to_none() {
        for doc in ["sharedStore: \"\"", "sharedStore: none", "sharedStore: None", "sharedStore: ~"] {
            let opts: Options = serde_yaml::from_str(doc).unwrap();
            assert_eq!(opts.shared_store, None, "{}", doc);
        }

        let opts: Options = serde_yaml::from_str("sharedStore: AlibabaCloud").unwrap();
        assert_eq!(opts.shared_store, Some(ObjectStorageType::AlibabaCloud));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = serde_yaml::from_str::<Options>("sharedStore: minio").unwrap_err();
        assert!(err.to_string().contains("Unknown object storage type: minio"), "{}", err);
    }

    #[test]
    fn test_options_default_has_no_backend() {
        let opts: Options = serde_yaml::from_str("secretName: creds").unwrap();
        assert_eq!(opts.shared_store, None);
        assert_eq!(opts.credential_mode(), CredentialMode::Static);
    }
}
