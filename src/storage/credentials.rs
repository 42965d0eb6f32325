//! Credential patch builder
//!
//! Mounts the storage secret and exposes the credentials the object store
//! client expects, either as static keys or through a projected service
//! account token.

use k8s_openapi::api::core::v1::{
    EnvVar, ProjectedVolumeSource, ServiceAccountTokenProjection, Volume, VolumeMount,
    VolumeProjection,
};
use tracing::debug;

use super::options::{
    AzureStorageConfig, CredentialMode, ObjectStorageType, Options, S3StorageConfig, SseType,
};
use super::patch::{env_var_from_secret, env_var_from_value, secret_volume, PodSpecPatch};
use super::vars::*;

/// Backend specific settings of the token flow
#[derive(Debug, Clone, Copy)]
enum ManagedAuth<'a> {
    Aws(&'a S3StorageConfig),
    Azure(&'a AzureStorageConfig),
}

impl<'a> ManagedAuth<'a> {
    /// Some exactly when [`Options::managed_auth_enabled`] holds
    fn from_options(opts: &'a Options) -> Option<Self> {
        match opts.shared_store {
            Some(ObjectStorageType::S3) => opts.s3.as_ref().filter(|s3| s3.sts).map(ManagedAuth::Aws),
            Some(ObjectStorageType::Azure) => opts
                .azure
                .as_ref()
                .filter(|azure| azure.workload_identity)
                .map(ManagedAuth::Azure),
            Some(ObjectStorageType::Gcs)
            | Some(ObjectStorageType::Swift)
            | Some(ObjectStorageType::AlibabaCloud)
            | None => None,
        }
    }

    fn audience(&self) -> &'a str {
        let (configured, default) = match *self {
            ManagedAuth::Aws(s3) => (s3.audience.as_str(), AWS_DEFAULT_AUDIENCE),
            ManagedAuth::Azure(azure) => (azure.audience.as_str(), AZURE_DEFAULT_AUDIENCE),
        };
        if configured.is_empty() {
            default
        } else {
            configured
        }
    }

    fn token_directory(&self) -> &'static str {
        match *self {
            ManagedAuth::Aws(_) => AWS_TOKEN_VOLUME_DIRECTORY,
            ManagedAuth::Azure(_) => AZURE_TOKEN_VOLUME_DIRECTORY,
        }
    }

    fn credentials(&self, opts: &Options, mode: CredentialMode) -> Vec<EnvVar> {
        let secret_name = opts.secret_name.as_str();
        let token_file = join_path(self.token_directory(), SA_TOKEN_PATH);

        match (*self, mode) {
            (ManagedAuth::Aws(_), CredentialMode::TokenCco) => vec![
                env_var_from_value(
                    ENV_AWS_CREDENTIALS_FILE,
                    join_path(MANAGED_AUTH_SECRET_DIRECTORY, KEY_AWS_CREDENTIALS_FILENAME),
                ),
                env_var_from_value(ENV_AWS_SDK_LOAD_CONFIG, "true"),
            ],
            (ManagedAuth::Aws(_), _) => vec![
                env_var_from_secret(ENV_AWS_ROLE_ARN, secret_name, KEY_AWS_ROLE_ARN),
                env_var_from_value(ENV_AWS_WEB_IDENTITY_TOKEN_FILE, token_file),
            ],
            (ManagedAuth::Azure(_), CredentialMode::TokenCco) => {
                let cco_secret = opts.open_shift.cloud_credentials.secret_name.as_str();
                vec![
                    env_var_from_secret(
                        ENV_AZURE_STORAGE_ACCOUNT_NAME,
                        secret_name,
                        KEY_AZURE_STORAGE_ACCOUNT_NAME,
                    ),
                    env_var_from_secret(
                        ENV_AZURE_CLIENT_ID,
                        cco_secret,
                        AZURE_MANAGED_CREDENTIAL_KEY_CLIENT_ID,
                    ),
                    env_var_from_secret(
                        ENV_AZURE_TENANT_ID,
                        cco_secret,
                        AZURE_MANAGED_CREDENTIAL_KEY_TENANT_ID,
                    ),
                    env_var_from_secret(
                        ENV_AZURE_SUBSCRIPTION_ID,
                        cco_secret,
                        AZURE_MANAGED_CREDENTIAL_KEY_SUBSCRIPTION_ID,
                    ),
                    env_var_from_value(ENV_AZURE_FEDERATED_TOKEN_FILE, token_file),
                ]
            }
            (ManagedAuth::Azure(_), _) => vec![
                env_var_from_secret(
                    ENV_AZURE_STORAGE_ACCOUNT_NAME,
                    secret_name,
                    KEY_AZURE_STORAGE_ACCOUNT_NAME,
                ),
                env_var_from_secret(ENV_AZURE_CLIENT_ID, secret_name, KEY_AZURE_STORAGE_CLIENT_ID),
                env_var_from_secret(ENV_AZURE_TENANT_ID, secret_name, KEY_AZURE_STORAGE_TENANT_ID),
                env_var_from_secret(
                    ENV_AZURE_SUBSCRIPTION_ID,
                    secret_name,
                    KEY_AZURE_STORAGE_SUBSCRIPTION_ID,
                ),
                env_var_from_value(ENV_AZURE_FEDERATED_TOKEN_FILE, token_file),
            ],
        }
    }
}

/// Append the storage secret mount and credential env vars to `patch`
pub fn ensure_object_store_credentials(mut patch: PodSpecPatch, opts: &Options) -> PodSpecPatch {
    let secret_name = opts.secret_name.as_str();

    patch.push_volume(secret_volume(secret_name));
    patch.push_volume_mount(VolumeMount {
        name: secret_name.to_string(),
        read_only: Some(false),
        mount_path: SECRET_DIRECTORY.to_string(),
        ..Default::default()
    });

    let mode = opts.credential_mode();
    match ManagedAuth::from_options(opts) {
        Some(auth) => {
            patch.extend_env(auth.credentials(opts, mode));
            patch.push_volume(sa_token_volume(auth.audience()));
            patch.push_volume_mount(sa_token_volume_mount(auth.token_directory()));

            if mode == CredentialMode::TokenCco {
                let cco_secret = opts.open_shift.cloud_credentials.secret_name.as_str();
                patch.push_volume(secret_volume(cco_secret));
                patch.push_volume_mount(VolumeMount {
                    name: cco_secret.to_string(),
                    mount_path: MANAGED_AUTH_SECRET_DIRECTORY.to_string(),
                    ..Default::default()
                });
            }
        }
        None => patch.extend_env(static_auth_credentials(opts)),
    }
    patch.extend_env(server_side_encryption(opts));

    debug!(
        backend = ?opts.shared_store,
        mode = %mode,
        secret = secret_name,
        volumes = patch.volumes.len(),
        "Prepared object storage credentials patch"
    );

    patch
}

fn static_auth_credentials(opts: &Options) -> Vec<EnvVar> {
    let secret_name = opts.secret_name.as_str();
    match opts.shared_store {
        Some(ObjectStorageType::AlibabaCloud) => vec![
            env_var_from_secret(
                ENV_ALIBABA_CLOUD_ACCESS_KEY_ID,
                secret_name,
                KEY_ALIBABA_CLOUD_ACCESS_KEY_ID,
            ),
            env_var_from_secret(
                ENV_ALIBABA_CLOUD_ACCESS_KEY_SECRET,
                secret_name,
                KEY_ALIBABA_CLOUD_SECRET_ACCESS_KEY,
            ),
        ],
        Some(ObjectStorageType::Azure) => vec![
            env_var_from_secret(
                ENV_AZURE_STORAGE_ACCOUNT_NAME,
                secret_name,
                KEY_AZURE_STORAGE_ACCOUNT_NAME,
            ),
            env_var_from_secret(
                ENV_AZURE_STORAGE_ACCOUNT_KEY,
                secret_name,
                KEY_AZURE_STORAGE_ACCOUNT_KEY,
            ),
        ],
        Some(ObjectStorageType::Gcs) => vec![env_var_from_value(
            ENV_GOOGLE_APPLICATION_CREDENTIALS,
            join_path(SECRET_DIRECTORY, KEY_GCP_SERVICE_ACCOUNT_KEY_FILENAME),
        )],
        Some(ObjectStorageType::S3) => vec![
            env_var_from_secret(ENV_AWS_ACCESS_KEY_ID, secret_name, KEY_AWS_ACCESS_KEY_ID),
            env_var_from_secret(ENV_AWS_ACCESS_KEY_SECRET, secret_name, KEY_AWS_ACCESS_KEY_SECRET),
        ],
        Some(ObjectStorageType::Swift) => vec![
            env_var_from_secret(ENV_SWIFT_USERNAME, secret_name, KEY_SWIFT_USERNAME),
            env_var_from_secret(ENV_SWIFT_PASSWORD, secret_name, KEY_SWIFT_PASSWORD),
        ],
        None => Vec::new(),
    }
}

fn server_side_encryption(opts: &Options) -> Vec<EnvVar> {
    let Some(ObjectStorageType::S3) = opts.shared_store else {
        return Vec::new();
    };

    match opts.s3.as_ref() {
        Some(s3)
            if s3.sse.sse_type == Some(SseType::Kms) && !s3.sse.kms_encryption_context.is_empty() =>
        {
            vec![env_var_from_secret(
                ENV_AWS_SSE_KMS_ENCRYPTION_CONTEXT,
                &opts.secret_name,
                KEY_AWS_SSE_KMS_ENCRYPTION_CONTEXT,
            )]
        }
        _ => Vec::new(),
    }
}

fn sa_token_volume(audience: &str) -> Volume {
    Volume {
        name: SA_TOKEN_VOLUME_NAME.to_string(),
        projected: Some(ProjectedVolumeSource {
            sources: Some(vec![VolumeProjection {
                service_account_token: Some(ServiceAccountTokenProjection {
                    expiration_seconds: Some(SA_TOKEN_EXPIRATION_SECONDS),
                    path: SA_TOKEN_PATH.to_string(),
                    audience: Some(audience.to_string()),
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn sa_token_volume_mount(token_directory: &str) -> VolumeMount {
    VolumeMount {
        name: SA_TOKEN_VOLUME_NAME.to_string(),
        mount_path: token_directory.to_string(),
        ..Default::default()
    }
}
