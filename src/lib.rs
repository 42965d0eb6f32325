//! Object Storage Credentials
//!
//! Wires object storage access into logging backend workloads. Given a
//! `Deployment` or `StatefulSet` and the resolved storage [`Options`], the
//! pod template is amended with the secret volume, credential env vars, an
//! optional projected service account token and, for S3, an optional custom
//! CA bundle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        configure_deployment / configure_statefulset          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Backend dispatch (azure | gcs | s3 | swift | alibabacloud)  │
//! │            │                                │                │
//! │  ┌─────────┴──────────┐          ┌──────────┴──────────┐     │
//! │  │ Credentials patch  │  then    │   CA patch (s3)     │     │
//! │  │ static | token |   │ ───────► │  config map volume  │     │
//! │  │ token-cco          │          │  + ca-file arg      │     │
//! │  └─────────┬──────────┘          └──────────┬──────────┘     │
//! │            └──────────────┬─────────────────┘                │
//! │                  ┌────────┴────────┐                         │
//! │                  │   Merge step    │                         │
//! │                  └─────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`storage`]: Options, patch builders and merge step
//! - [`workload`]: Workload shapes carrying a pod template
//! - [`manifest`]: YAML manifest helpers used by the CLI
//! - [`error`]: Error types and handling

pub mod error;
pub mod manifest;
pub mod storage;
pub mod workload;

// Re-export commonly used types
pub use storage::{
    configure_deployment, configure_statefulset, configure_workload,
    AlibabaCloudStorageConfig, AzureStorageConfig, CloudCredentials, CredentialMode,
    GcsStorageConfig, ObjectStorageType, OpenShiftOptions, Options, S3SseConfig,
    S3StorageConfig, SseType, SwiftStorageConfig, TlsConfig,
};

pub use error::{Error, ErrorAction, MergeError, MergeStage, Result};

pub use manifest::Workload;
pub use workload::PodTemplateWorkload;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
