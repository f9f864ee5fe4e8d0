// Copyright 2025 K8s Manager Team.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::settings::HpaSettings;
use k8s_openapi::api::autoscaling::v1::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builds the `autoscaling/v1` HorizontalPodAutoscaler targeting the app's
/// Deployment by name.
pub struct AutoscalerBuilder<'a> {
    namespace: &'a str,
    app: &'a str,
    hpa: &'a HpaSettings,
}

impl<'a> AutoscalerBuilder<'a> {
    pub fn new(namespace: &'a str, app: &'a str, hpa: &'a HpaSettings) -> Self {
        Self {
            namespace,
            app,
            hpa,
        }
    }

    pub fn build(&self) -> HorizontalPodAutoscaler {
        HorizontalPodAutoscaler {
            metadata: ObjectMeta {
                name: Some(self.app.to_string()),
                namespace: Some(self.namespace.to_string()),
                ..Default::default()
            },
            spec: Some(HorizontalPodAutoscalerSpec {
                min_replicas: Some(self.hpa.min_pods),
                max_replicas: self.hpa.max_pods,
                scale_target_ref: CrossVersionObjectReference {
                    api_version: Some("apps/v1".to_string()),
                    kind: "Deployment".to_string(),
                    name: self.app.to_string(),
                },
                target_cpu_utilization_percentage: Some(self.hpa.target_cpu_percent),
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_deployment_by_name() {
        let hpa = HpaSettings {
            min_pods: 2,
            max_pods: 6,
            target_cpu_percent: 75,
        };
        let autoscaler = AutoscalerBuilder::new("prod", "api", &hpa).build();
        let spec = autoscaler.spec.unwrap();

        assert_eq!(spec.scale_target_ref.kind, "Deployment");
        assert_eq!(spec.scale_target_ref.name, "api");
        assert_eq!(spec.min_replicas, Some(2));
        assert_eq!(spec.max_replicas, 6);
        assert_eq!(spec.target_cpu_utilization_percentage, Some(75));
    }
}
