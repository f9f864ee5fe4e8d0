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
use crate::infrastructure::constants::{INGRESS_CLASS_ANNOTATION, INGRESS_CLASS_NGINX};
use crate::shared::error::{Result, WizardError};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Builds the `networking.k8s.io/v1` Ingress routing one host to the app's
/// Service. Only applicable when the deployment is public.
pub struct IngressBuilder<'a> {
    settings: &'a DeploySettings,
    host: &'a str,
}

impl<'a> IngressBuilder<'a> {
    pub fn new(settings: &'a DeploySettings) -> Result<Self> {
        let host = settings.host.as_deref().ok_or_else(|| {
            WizardError::Validation(format!(
                "application '{}' is public but has no host",
                settings.app_name
            ))
        })?;
        Ok(Self { settings, host })
    }

    pub fn build(&self) -> Ingress {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            INGRESS_CLASS_ANNOTATION.to_string(),
            INGRESS_CLASS_NGINX.to_string(),
        );

        Ingress {
            metadata: ObjectMeta {
                name: Some(self.settings.app_name.clone()),
                namespace: Some(self.settings.namespace.clone()),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: Some(IngressSpec {
                rules: Some(vec![IngressRule {
                    host: Some(self.host.to_string()),
                    http: Some(HTTPIngressRuleValue {
                        paths: vec![HTTPIngressPath {
                            path: Some("/".to_string()),
                            path_type: "Prefix".to_string(),
                            backend: IngressBackend {
                                service: Some(IngressServiceBackend {
                                    name: self.settings.app_name.clone(),
                                    port: Some(ServiceBackendPort {
                                        number: Some(self.settings.port as i32),
                                        ..Default::default()
                                    }),
                                }),
                                ..Default::default()
                            },
                        }],
                    }),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
