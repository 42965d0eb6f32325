//! Well-known names shared with the secret and config map provisioning side
//!
//! Environment variable names, secret data keys, mount directories and token
//! audiences. Changing any of these breaks pods that read credentials written
//! by the provisioning controller.

// =============================================================================
// Environment Variables
// =============================================================================

/// AlibabaCloud client id to access OSS
pub const ENV_ALIBABA_CLOUD_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
/// AlibabaCloud client secret to access OSS
pub const ENV_ALIBABA_CLOUD_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";

/// AWS client id to access S3
pub const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// AWS client secret to access S3
pub const ENV_AWS_ACCESS_KEY_SECRET: &str = "AWS_ACCESS_KEY_SECRET";
/// AWS KMS encryption context when using SSE-KMS
pub const ENV_AWS_SSE_KMS_ENCRYPTION_CONTEXT: &str = "AWS_SSE_KMS_ENCRYPTION_CONTEXT";
/// Role ARN assumed in the federated identity workflow
pub const ENV_AWS_ROLE_ARN: &str = "AWS_ROLE_ARN";
/// Path to the web identity token used in the federated identity workflow
pub const ENV_AWS_WEB_IDENTITY_TOKEN_FILE: &str = "AWS_WEB_IDENTITY_TOKEN_FILE";
/// Path to the shared credentials file written by the platform
pub const ENV_AWS_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
/// Makes the AWS SDK load the shared credentials file
pub const ENV_AWS_SDK_LOAD_CONFIG: &str = "AWS_SDK_LOAD_CONFIG";

/// Azure storage account name
pub const ENV_AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
/// Azure storage account key
pub const ENV_AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
/// Managed identity client id
pub const ENV_AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
/// Managed identity tenant id
pub const ENV_AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
/// Managed identity subscription id
pub const ENV_AZURE_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
/// Path to the federated managed identity token
pub const ENV_AZURE_FEDERATED_TOKEN_FILE: &str = "AZURE_FEDERATED_TOKEN_FILE";

/// Path to the GCP service account key.json
pub const ENV_GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// OpenStack Swift username
pub const ENV_SWIFT_USERNAME: &str = "SWIFT_USERNAME";
/// OpenStack Swift password
pub const ENV_SWIFT_PASSWORD: &str = "SWIFT_PASSWORD";

// =============================================================================
// Secret Data Keys
// =============================================================================

pub const KEY_ALIBABA_CLOUD_ACCESS_KEY_ID: &str = "access_key_id";
pub const KEY_ALIBABA_CLOUD_SECRET_ACCESS_KEY: &str = "secret_access_key";

pub const KEY_AWS_ACCESS_KEY_ID: &str = "access_key_id";
pub const KEY_AWS_ACCESS_KEY_SECRET: &str = "access_key_secret";
pub const KEY_AWS_SSE_KMS_ENCRYPTION_CONTEXT: &str = "sse_kms_encryption_context";
pub const KEY_AWS_ROLE_ARN: &str = "role_arn";
/// File name of the credentials file inside the platform-managed secret
pub const KEY_AWS_CREDENTIALS_FILENAME: &str = "credentials";

pub const KEY_AZURE_STORAGE_ACCOUNT_NAME: &str = "account_name";
pub const KEY_AZURE_STORAGE_ACCOUNT_KEY: &str = "account_key";
pub const KEY_AZURE_STORAGE_CLIENT_ID: &str = "client_id";
pub const KEY_AZURE_STORAGE_TENANT_ID: &str = "tenant_id";
pub const KEY_AZURE_STORAGE_SUBSCRIPTION_ID: &str = "subscription_id";

/// Keys of the platform-managed Azure credentials secret
pub const AZURE_MANAGED_CREDENTIAL_KEY_CLIENT_ID: &str = "azure_client_id";
pub const AZURE_MANAGED_CREDENTIAL_KEY_TENANT_ID: &str = "azure_tenant_id";
pub const AZURE_MANAGED_CREDENTIAL_KEY_SUBSCRIPTION_ID: &str = "azure_subscription_id";

/// File name of the service account key inside the storage secret
pub const KEY_GCP_SERVICE_ACCOUNT_KEY_FILENAME: &str = "key.json";

pub const KEY_SWIFT_USERNAME: &str = "username";
pub const KEY_SWIFT_PASSWORD: &str = "password";

// =============================================================================
// Volumes and Mounts
// =============================================================================

/// Where the storage secret is mounted
pub const SECRET_DIRECTORY: &str = "/etc/storage/secrets";
/// Where the platform-managed credentials secret is mounted
pub const MANAGED_AUTH_SECRET_DIRECTORY: &str = "/etc/storage/managed-auth";

pub const STORAGE_TLS_VOLUME: &str = "storage-tls";
/// Where the custom CA config map is mounted
pub const CA_DIRECTORY: &str = "/etc/storage/ca";

pub const SA_TOKEN_VOLUME_NAME: &str = "bound-sa-token";
/// Lifetime of the projected service account token
pub const SA_TOKEN_EXPIRATION_SECONDS: i64 = 3600;
/// File name of the projected token inside its mount directory
pub const SA_TOKEN_PATH: &str = "token";

pub const AWS_DEFAULT_AUDIENCE: &str = "sts.amazonaws.com";
pub const AWS_TOKEN_VOLUME_DIRECTORY: &str = "/var/run/secrets/aws/serviceaccount";

pub const AZURE_DEFAULT_AUDIENCE: &str = "api://AzureADTokenExchange";
pub const AZURE_TOKEN_VOLUME_DIRECTORY: &str = "/var/run/secrets/azure/serviceaccount";

/// Join a mount directory and a file name into a cleaned absolute path
///
/// Empty and `.` segments are dropped and `..` removes the previous segment,
/// so `./ca.crt` and `certs//ca.crt` resolve inside the directory.
pub(crate) fn join_path(dir: &str, file: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(file.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(CA_DIRECTORY, "service-ca.crt"), "/etc/storage/ca/service-ca.crt");
        assert_eq!(join_path("/etc/storage/ca/", "/ca.crt"), "/etc/storage/ca/ca.crt");
        assert_eq!(join_path(CA_DIRECTORY, ""), CA_DIRECTORY);
    }

    #[test]
    fn test_join_path_cleans_segments() {
        assert_eq!(join_path(CA_DIRECTORY, "./ca.crt"), "/etc/storage/ca/ca.crt");
        assert_eq!(join_path(CA_DIRECTORY, "certs//ca.crt"), "/etc/storage/ca/certs/ca.crt");
        assert_eq!(join_path(CA_DIRECTORY, "../ca/ca.crt"), "/etc/storage/ca/ca.crt");
        assert_eq!(join_path("/", "../../ca.crt"), "/ca.crt");
    }
}
