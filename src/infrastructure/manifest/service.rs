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
use crate::infrastructure::constants::{LABEL_APP, PORT_NAME_HTTP};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Builds the `v1` Service mapping the service port to the container port,
/// selecting pods by the app label.
pub struct ServiceBuilder<'a> {
    settings: &'a DeploySettings,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(settings: &'a DeploySettings) -> Self {
        Self { settings }
    }

    pub fn build(&self) -> Service {
        let mut selector = BTreeMap::new();
        selector.insert(LABEL_APP.to_string(), self.settings.app_name.clone());

        Service {
            metadata: ObjectMeta {
                name: Some(self.settings.app_name.clone()),
                namespace: Some(self.settings.namespace.clone()),
                labels: Some(selector.clone()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    name: Some(PORT_NAME_HTTP.to_string()),
                    port: self.settings.port as i32,
                    target_port: Some(IntOrString::Int(self.settings.target_port as i32)),
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                }]),
                selector: Some(selector),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
