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

use crate::domain::settings::DeploySettings;
use crate::infrastructure::constants::*;
use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment,
};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Builds the `apps/v1` Deployment for an application. Resource requests
/// and limits are fixed policy, not operator-configurable.
pub struct DeploymentBuilder<'a> {
    settings: &'a DeploySettings,
}

impl<'a> DeploymentBuilder<'a> {
    pub fn new(settings: &'a DeploySettings) -> Self {
        Self { settings }
    }

    pub fn build(&self) -> Deployment {
        let app = &self.settings.app_name;
        let labels = self.get_labels();

        let mut annotations = BTreeMap::new();
        // Surfaces the image in `kubectl rollout history`.
        annotations.insert(
            CHANGE_CAUSE_ANNOTATION.to_string(),
            self.settings.image.clone(),
        );

        Deployment {
            metadata: ObjectMeta {
                name: Some(app.clone()),
                namespace: Some(self.settings.namespace.clone()),
                labels: Some(labels.clone()),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(self.settings.replicas),
                revision_history_limit: Some(REVISION_HISTORY_LIMIT),
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..Default::default()
                },
                strategy: Some(DeploymentStrategy {
                    type_: Some(STRATEGY_TYPE_ROLLING_UPDATE.to_string()),
                    rolling_update: Some(RollingUpdateDeployment {
                        max_unavailable: Some(IntOrString::String(MAX_UNAVAILABLE.to_string())),
                        max_surge: Some(IntOrString::Int(MAX_SURGE)),
                    }),
                }),
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![self.build_container()],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn build_container(&self) -> Container {
        let mut requests = BTreeMap::new();
        requests.insert("memory".to_string(), Quantity(MEMORY_REQUEST.to_string()));
        requests.insert("cpu".to_string(), Quantity(CPU_REQUEST.to_string()));

        let mut limits = BTreeMap::new();
        limits.insert("memory".to_string(), Quantity(MEMORY_LIMIT.to_string()));
        limits.insert("cpu".to_string(), Quantity(CPU_LIMIT.to_string()));

        Container {
            name: self.settings.app_name.clone(),
            image: Some(self.settings.image.clone()),
            image_pull_policy: Some(IMAGE_PULL_POLICY.to_string()),
            ports: Some(vec![ContainerPort {
                container_port: self.settings.target_port as i32,
                ..Default::default()
            }]),
            resources: Some(ResourceRequirements {
                requests: Some(requests),
                limits: Some(limits),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), self.settings.app_name.clone());
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DeploySettings {
        DeploySettings {
            namespace: "default".to_string(),
            app_name: "web".to_string(),
            image: "registry.io/web:2".to_string(),
            target_port: 3000,
            port: 80,
            replicas: 3,
            is_public: false,
            host: None,
        }
    }

    #[test]
    fn test_single_container_named_after_app() {
        let deployment = DeploymentBuilder::new(&settings()).build();
        let containers = deployment.spec.unwrap().template.spec.unwrap().containers;
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name, "web");
        assert_eq!(containers[0].image.as_deref(), Some("registry.io/web:2"));
        assert_eq!(containers[0].image_pull_policy.as_deref(), Some("Always"));
    }

    #[test]
    fn test_fixed_resource_policy() {
        let deployment = DeploymentBuilder::new(&settings()).build();
        let resources = deployment.spec.unwrap().template.spec.unwrap().containers[0]
            .resources
            .clone()
            .unwrap();

        let requests = resources.requests.unwrap();
        assert_eq!(requests["memory"].0, "1024Mi");
        assert_eq!(requests["cpu"].0, "300m");
        let limits = resources.limits.unwrap();
        assert_eq!(limits["memory"].0, "1536Mi");
        assert_eq!(limits["cpu"].0, "500m");
    }

    #[test]
    fn test_rolling_update_strategy() {
        let spec = DeploymentBuilder::new(&settings()).build().spec.unwrap();
        assert_eq!(spec.revision_history_limit, Some(3));
        assert_eq!(spec.replicas, Some(3));

        let strategy = spec.strategy.unwrap();
        assert_eq!(strategy.type_.as_deref(), Some("RollingUpdate"));
        let rolling = strategy.rolling_update.unwrap();
        assert_eq!(
            rolling.max_unavailable,
            Some(IntOrString::String("25%".to_string()))
        );
        assert_eq!(rolling.max_surge, Some(IntOrString::Int(1)));
    }

    #[test]
    fn test_change_cause_annotation_records_image() {
        let deployment = DeploymentBuilder::new(&settings()).build();
        let annotations = deployment.metadata.annotations.unwrap();
        assert_eq!(
            annotations.get("kubernetes.io/change-cause").map(String::as_str),
            Some("registry.io/web:2")
        );
    }
}
