//! Workload manifests
//!
//! YAML in, YAML out. Used by the CLI to run the storage configuration
//! against rendered manifests without a cluster.

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::{self, Options};

/// A supported workload manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Workload {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
}

impl Workload {
    /// Parse a single YAML document, dispatching on its `kind`
    pub fn from_yaml(doc: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(doc)?;
        let kind = value
            .get("kind")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!(kind = %kind, "Parsing workload manifest");
        match kind.as_str() {
            "Deployment" => Ok(Workload::Deployment(serde_yaml::from_value(value)?)),
            "StatefulSet" => Ok(Workload::StatefulSet(serde_yaml::from_value(value)?)),
            _ => Err(Error::UnsupportedKind(kind)),
        }
    }

    /// Render back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply the object storage configuration to this workload
    pub fn configure(&mut self, opts: &Options) -> Result<()> {
        match self {
            Workload::Deployment(d) => storage::configure_deployment(d, opts),
            Workload::StatefulSet(s) => storage::configure_statefulset(s, opts),
        }
    }
}
