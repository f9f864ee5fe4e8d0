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

//! Pure builders turning finalized settings into Kubernetes resource
//! documents, plus the multi-document YAML bundle handed to `kubectl apply`.

pub mod autoscaler;
pub mod deployment;
pub mod ingress;
pub mod service;

pub use autoscaler::AutoscalerBuilder;
pub use deployment::DeploymentBuilder;
pub use ingress::IngressBuilder;
pub use service::ServiceBuilder;

use crate::domain::settings::{DeploySettings, HpaSettings};
use crate::shared::error::Result;
use serde::Serialize;

/// Serialize a typed resource into a YAML document. `k8s-openapi` keeps
/// `apiVersion`/`kind` as trait constants rather than struct fields, so they
/// are spliced in here; `kubectl apply` refuses documents without them.
fn to_document<K>(resource: &K) -> Result<serde_yaml::Value>
where
    K: k8s_openapi::Resource + Serialize,
{
    let body = serde_yaml::to_value(resource)?;

    let mut map = serde_yaml::Mapping::new();
    map.insert("apiVersion".into(), K::API_VERSION.into());
    map.insert("kind".into(), K::KIND.into());
    if let serde_yaml::Value::Mapping(rest) = body {
        for (k, v) in rest {
            map.insert(k, v);
        }
    }

    Ok(serde_yaml::Value::Mapping(map))
}

/// Build the ordered manifest bundle for one deploy action: Deployment,
/// Service, then Ingress (only when the app is public) and Autoscaler (only
/// when HPA was configured). Documents are joined by `---` lines so a single
/// apply covers the whole set.
pub fn render_bundle(settings: &DeploySettings, hpa: Option<&HpaSettings>) -> Result<String> {
    let mut documents = Vec::new();

    let deployment = DeploymentBuilder::new(settings).build();
    documents.push(to_document(&deployment)?);

    let service = ServiceBuilder::new(settings).build();
    documents.push(to_document(&service)?);

    if settings.is_public {
        let ingress = IngressBuilder::new(settings)?.build();
        documents.push(to_document(&ingress)?);
    }

    if let Some(hpa) = hpa {
        let autoscaler =
            AutoscalerBuilder::new(&settings.namespace, &settings.app_name, hpa).build();
        documents.push(to_document(&autoscaler)?);
    }

    let rendered: Vec<String> = documents
        .iter()
        .map(serde_yaml::to_string)
        .collect::<std::result::Result<_, _>>()?;

    Ok(rendered.join("---\n"))
}
