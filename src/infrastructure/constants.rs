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

/// AWS regions offered for cluster selection. Regions requiring account
/// opt-in (ap-east-1, me-south-1) are intentionally absent.
pub const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-2",
    "ap-south-1",
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "sa-east-1",
];

pub const GCP_REGIONS: &[&str] = &[
    "northamerica-northeast-1",
    "us-central1",
    "us-east1",
    "us-east4",
    "us-west1",
    "us-west2",
    "southamerica-east1",
    "europe-north1",
    "europe-west1",
    "europe-west2",
    "europe-west3",
    "europe-west4",
    "europe-west6",
    "asia-east1",
    "asia-east2",
    "asia-northeast1",
    "asia-northeast2",
    "asia-south1",
    "asia-southeast1",
    "australia-southeast1",
];

/// AWS profile the credentials are written under; must match the profile
/// referenced by the exec-credential entry in the kubeconfig.
pub const AWS_PROFILE: &str = "default";

/// Path the gcloud binary is pinned to in the kubeconfig auth-provider.
pub const GCLOUD_BIN_PATH: &str = "/usr/local/bin/google-cloud-sdk/bin/gcloud";

/// File names under the application config directory.
pub const SECRETS_FILE_NAME: &str = "secrets.json";
pub const EVENTS_FILE_NAME: &str = "events.jsonl";
pub const GCP_CREDS_FILE_NAME: &str = "gcp.json";
pub const MANIFEST_FILE_NAME: &str = "k8s-manager.yaml";

/// Resource kinds supported by the list action.
pub const RESOURCE_TYPES: &[&str] = &["pods", "deployments"];

/// Sentinel menu entry for listing across every namespace.
pub const ALL_NAMESPACES: &str = "Use all namespaces";

/// Namespaces the add-on catalog installs into.
pub const NAMESPACE_KUBE_SYSTEM: &str = "kube-system";
pub const NAMESPACE_MONITORING: &str = "monitoring";

/// Resource labels
pub const LABEL_APP: &str = "app";

/// Deployment policy (not operator-configurable)
pub const MEMORY_REQUEST: &str = "1024Mi";
pub const CPU_REQUEST: &str = "300m";
pub const MEMORY_LIMIT: &str = "1536Mi";
pub const CPU_LIMIT: &str = "500m";
pub const MAX_UNAVAILABLE: &str = "25%";
pub const MAX_SURGE: i32 = 1;
pub const REVISION_HISTORY_LIMIT: i32 = 3;
pub const IMAGE_PULL_POLICY: &str = "Always";
pub const STRATEGY_TYPE_ROLLING_UPDATE: &str = "RollingUpdate";

/// Service port name
pub const PORT_NAME_HTTP: &str = "http";

/// Ingress class annotation (nginx-ingress add-on)
pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
pub const INGRESS_CLASS_NGINX: &str = "nginx";

/// Annotation recording which image a rollout revision shipped.
pub const CHANGE_CAUSE_ANNOTATION: &str = "kubernetes.io/change-cause";

/// Helm stable chart repository
pub const HELM_STABLE_REPO_NAME: &str = "stable";
pub const HELM_STABLE_REPO_URL: &str = "https://charts.helm.sh/stable";
