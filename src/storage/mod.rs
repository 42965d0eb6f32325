//! Object storage wiring for workloads
//!
//! Appends pod volumes and container env vars, args and volume mounts based on
//! the object storage type:
//! - All: mount the storage secret and expose its credentials as env vars,
//!   either static keys or a projected service account token
//! - GCS: point `GOOGLE_APPLICATION_CREDENTIALS` at the mounted key file
//! - S3: mount a custom CA config map when TLS is configured
//!
//! Every call seeds a patch from a copy of the first container, appends to
//! it and merges it back. Nothing is deduplicated: configuring the same
//! workload twice appends twice, callers start from a freshly rendered
//! workload on every reconcile.

pub mod ca;
pub mod credentials;
pub mod merge;
pub mod options;
pub mod patch;
pub mod vars;

pub use options::*;
pub use patch::PodSpecPatch;

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use kube::ResourceExt;
use tracing::{debug, trace};

use crate::error::{Error, MergeError, MergeStage, Result};
use crate::workload::PodTemplateWorkload;

/// Configure object storage access for a deployment
pub fn configure_deployment(d: &mut Deployment, opts: &Options) -> Result<()> {
    configure_workload(d, opts)
}

/// Configure object storage access for a statefulset
pub fn configure_statefulset(s: &mut StatefulSet, opts: &Options) -> Result<()> {
    configure_workload(s, opts)
}

/// Shared pipeline behind the per-shape entry points
pub fn configure_workload<W: PodTemplateWorkload>(workload: &mut W, opts: &Options) -> Result<()> {
    let Some(store) = opts.shared_store else {
        trace!(workload = %workload.name_any(), "No object storage configured, skipping");
        return Ok(());
    };

    apply_patch(workload, MergeStage::Credentials, |patch| {
        credentials::ensure_object_store_credentials(patch, opts)
    })?;

    if !supports_custom_ca(store) {
        return Ok(());
    }
    match opts.tls.as_ref() {
        Some(tls) => apply_patch(workload, MergeStage::CertificateAuthority, |patch| {
            ca::ensure_ca_for_s3(patch, tls)
        }),
        None => Ok(()),
    }
}

/// Custom CA injection is only defined for S3
fn supports_custom_ca(store: ObjectStorageType) -> bool {
    match store {
        ObjectStorageType::S3 => true,
        ObjectStorageType::Azure
        | ObjectStorageType::Gcs
        | ObjectStorageType::Swift
        | ObjectStorageType::AlibabaCloud => false,
    }
}

fn apply_patch<W, F>(workload: &mut W, stage: MergeStage, build: F) -> Result<()>
where
    W: PodTemplateWorkload,
    F: FnOnce(PodSpecPatch) -> PodSpecPatch,
{
    let name = workload.name_any();
    let pod_spec = workload
        .pod_spec_mut()
        .ok_or_else(|| Error::merge(stage, MergeError::MissingPodSpec))?;

    let seed = PodSpecPatch::from_pod_spec(pod_spec).map_err(|e| Error::merge(stage, e))?;
    let patch = build(seed);

    merge::merge_pod_spec(pod_spec, patch.into_pod_spec()).map_err(|e| Error::merge(stage, e))?;

    debug!(workload = %name, kind = %W::kind(&()), stage = %stage, "Merged object storage patch");
    Ok(())
}
