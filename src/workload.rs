//! Workload shapes carrying a pod template

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PodSpec;
use kube::Resource;

/// A workload whose pod template can be amended in place
pub trait PodTemplateWorkload: Resource<DynamicType = ()> {
    /// Pod spec of the template, if the workload has one
    fn pod_spec_mut(&mut self) -> Option<&mut PodSpec>;
}

impl PodTemplateWorkload for Deployment {
    fn pod_spec_mut(&mut self) -> Option<&mut PodSpec> {
        self.spec.as_mut()?.template.spec.as_mut()
    }
}

impl PodTemplateWorkload for StatefulSet {
    fn pod_spec_mut(&mut self) -> Option<&mut PodSpec> {
        self.spec.as_mut()?.template.spec.as_mut()
    }
}
