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

//! Thin wrapper over the `kubectl` binary. Queries return reduced records;
//! raw cluster state is never cached across actions.

use crate::domain::settings::{HpaSettings, PriorConfig};
use crate::shared::error::{Result, WizardError};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::exec::{CommandOutput, CommandRunner};

/// One revision line from `kubectl rollout history`.
#[derive(Debug, Clone)]
pub struct RolloutRevision {
    pub number: String,
    pub change_cause: String,
}

/// Reduced pod record for the list action.
#[derive(Debug, Clone)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub age: String,
    pub containers: BTreeMap<String, String>,
    pub node: Option<String>,
    pub pod_ip: Option<String>,
    pub ready: String,
}

/// Reduced deployment record for the list action.
#[derive(Debug, Clone)]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub age: String,
    pub containers: BTreeMap<String, String>,
    pub selector: Vec<String>,
    pub ready: String,
}

pub struct Kubectl<'a> {
    runner: &'a dyn CommandRunner,
    kubeconfig: Option<PathBuf>,
}

impl<'a> Kubectl<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            kubeconfig: None,
        }
    }

    /// Scope every invocation to a managed kubeconfig instead of the
    /// operator's ambient `~/.kube/config`.
    pub fn with_kubeconfig(runner: &'a dyn CommandRunner, kubeconfig: PathBuf) -> Self {
        Self {
            runner,
            kubeconfig: Some(kubeconfig),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        match &self.kubeconfig {
            Some(path) => {
                let flag = format!("--kubeconfig={}", path.display());
                let mut full = args.to_vec();
                full.push(flag.as_str());
                self.runner.run("kubectl", &full).await
            }
            None => self.runner.run("kubectl", args).await,
        }
    }

    async fn get_json(&self, args: &[&str]) -> Result<Value> {
        let output = self.run(args).await?;
        serde_json::from_str(&output.stdout)
            .map_err(|e| WizardError::malformed_output("kubectl", e.to_string()))
    }

    pub async fn namespaces(&self) -> Result<Vec<String>> {
        let json = self.get_json(&["get", "ns", "-o", "json"]).await?;
        Ok(item_names(&json))
    }

    /// Names of Deployments in a namespace; the wizard treats these as the
    /// existing applications.
    pub async fn apps(&self, namespace: &str) -> Result<Vec<String>> {
        let json = self
            .get_json(&["get", "deploy", "-n", namespace, "-o", "json"])
            .await?;
        Ok(item_names(&json))
    }

    pub async fn rollout_history(
        &self,
        namespace: &str,
        app: &str,
    ) -> Result<Vec<RolloutRevision>> {
        let deploy_ref = format!("deploy/{}", app);
        let output = self
            .run(&["rollout", "history", &deploy_ref, "-n", namespace])
            .await?;

        // Skip the resource header and the NUMBER/CHANGE-CAUSE column line,
        // newest revision first.
        let lines: Vec<&str> = output.stdout.trim().lines().skip(2).collect();
        let revisions = lines
            .iter()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut parts = line.split_whitespace();
                RolloutRevision {
                    number: parts.next().unwrap_or_default().to_string(),
                    change_cause: parts.next().unwrap_or_default().to_string(),
                }
            })
            .collect();

        Ok(revisions)
    }

    /// Gather the prior deployment/service/ingress/HPA configuration for an
    /// existing application.
    pub async fn prior_config(&self, namespace: &str, app: &str) -> Result<PriorConfig> {
        let deploy = self
            .get_json(&["get", "deploy", app, "-n", namespace, "-o", "json"])
            .await?;
        let replicas = deploy["spec"]["replicas"].as_i64().unwrap_or(1) as i32;

        let service = self
            .get_json(&["get", "svc", app, "-n", namespace, "-o", "json"])
            .await?;
        let first_port = &service["spec"]["ports"][0];
        let port = first_port["port"].as_i64().unwrap_or(0) as u16;
        let target_port = first_port["targetPort"].as_i64().unwrap_or(0) as u16;

        let mut config = PriorConfig {
            target_port,
            port,
            replicas,
            is_public: false,
            host: None,
            hpa: None,
        };

        // Public iff an ingress with the app's name exists.
        let ingresses = self
            .get_json(&["get", "ing", "-n", namespace, "-o", "json"])
            .await?;
        if item_names(&ingresses).iter().any(|name| name == app) {
            let ingress = self
                .get_json(&["get", "ing", app, "-n", namespace, "-o", "json"])
                .await?;
            config.is_public = true;
            config.host = ingress["spec"]["rules"][0]["host"]
                .as_str()
                .map(String::from);
        }

        let autoscalers = self
            .get_json(&["get", "hpa", "-n", namespace, "-o", "json"])
            .await?;
        if item_names(&autoscalers).iter().any(|name| name == app) {
            let hpa = self
                .get_json(&["get", "hpa", app, "-n", namespace, "-o", "json"])
                .await?;
            config.hpa = Some(HpaSettings {
                min_pods: hpa["spec"]["minReplicas"].as_i64().unwrap_or(1) as i32,
                max_pods: hpa["spec"]["maxReplicas"].as_i64().unwrap_or(1) as i32,
                target_cpu_percent: hpa["spec"]["targetCPUUtilizationPercentage"]
                    .as_i64()
                    .unwrap_or(0) as i32,
            });
        }

        Ok(config)
    }

    pub async fn apply_file(&self, path: &Path, namespace: Option<&str>) -> Result<String> {
        let path_str = path.to_string_lossy();
        let mut args = vec!["apply", "-f", path_str.as_ref()];
        if let Some(ns) = namespace {
            args.extend(["-n", ns]);
        }
        let output = self.run(&args).await?;
        Ok(output.stdout)
    }

    /// Create a namespace, treating AlreadyExists as success.
    pub async fn create_namespace_if_absent(&self, name: &str) -> Result<()> {
        match self.run(&["create", "namespace", name]).await {
            Ok(_) => Ok(()),
            Err(WizardError::CommandFailed { ref stderr, .. })
                if stderr.contains("AlreadyExists") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Context names from the scoped kubeconfig. A missing or empty
    /// context list is a kubeconfig error so the caller can loop back to
    /// credential retrieval.
    pub async fn contexts(&self) -> Result<Vec<String>> {
        let json = self.get_json(&["config", "view", "-o", "json"]).await?;

        let contexts: Vec<String> = json["contexts"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|c| c["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        if contexts.is_empty() {
            return Err(WizardError::Kubeconfig(
                "no contexts found in the supplied kubeconfig".to_string(),
            ));
        }
        Ok(contexts)
    }

    /// Pin the context's namespace to `default` and make it current.
    /// An unset namespace is a known failure mode for raw YAML applies.
    pub async fn activate_context(&self, context: &str) -> Result<()> {
        self.run(&["config", "set-context", context, "--namespace=default"])
            .await?;
        self.run(&["config", "use-context", context]).await?;
        Ok(())
    }

    pub async fn pods(&self, namespace: Option<&str>) -> Result<Vec<PodInfo>> {
        let json = match namespace {
            Some(ns) => self.get_json(&["get", "pods", "-n", ns, "-o", "json"]).await?,
            None => self.get_json(&["get", "pods", "-A", "-o", "json"]).await?,
        };

        let items = json["items"].as_array().cloned().unwrap_or_default();
        Ok(items.iter().map(reduce_pod).collect())
    }

    pub async fn deployments(&self, namespace: Option<&str>) -> Result<Vec<DeploymentInfo>> {
        let json = match namespace {
            Some(ns) => {
                self.get_json(&["get", "deployments", "-n", ns, "-o", "json"])
                    .await?
            }
            None => {
                self.get_json(&["get", "deployments", "-A", "-o", "json"])
                    .await?
            }
        };

        let items = json["items"].as_array().cloned().unwrap_or_default();
        Ok(items.iter().map(reduce_deployment).collect())
    }
}

fn item_names(json: &Value) -> Vec<String> {
    json["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["metadata"]["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn container_images(containers: &Value) -> BTreeMap<String, String> {
    containers
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|c| {
                    let name = c["name"].as_str()?;
                    let image = c["image"].as_str().unwrap_or("-");
                    Some((name.to_string(), image.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Human-readable age ("3d7h") from a creation timestamp.
fn format_age(creation_timestamp: Option<&str>) -> String {
    let Some(ts) = creation_timestamp else {
        return "-".to_string();
    };
    let Ok(created) = DateTime::parse_from_rfc3339(ts) else {
        return "-".to_string();
    };

    let elapsed = Utc::now().signed_duration_since(created.with_timezone(&Utc));
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() - days * 24;
    if hours > 0 {
        format!("{}d{}h", days, hours)
    } else {
        format!("{}d", days)
    }
}

fn ready_container_count(status: &Value) -> i64 {
    let phase = status["phase"].as_str().unwrap_or_default().to_lowercase();

    // Pending pods often have no containerStatuses yet; fall back to
    // counting satisfied conditions.
    if phase == "pending" && status["containerStatuses"].is_null() {
        return status["conditions"]
            .as_array()
            .map(|conds| {
                conds
                    .iter()
                    .filter(|c| c["status"].as_str() == Some("True"))
                    .count() as i64
            })
            .unwrap_or(0);
    }

    status["containerStatuses"]
        .as_array()
        .map(|statuses| {
            statuses
                .iter()
                .filter(|c| c["ready"].as_bool().unwrap_or(false))
                .count() as i64
        })
        .unwrap_or(0)
}

fn reduce_pod(item: &Value) -> PodInfo {
    let containers = container_images(&item["spec"]["containers"]);
    let total = containers.len();
    let ready = ready_container_count(&item["status"]);

    PodInfo {
        name: item["metadata"]["name"].as_str().unwrap_or("-").to_string(),
        namespace: item["metadata"]["namespace"]
            .as_str()
            .unwrap_or("-")
            .to_string(),
        status: item["status"]["phase"].as_str().unwrap_or("-").to_string(),
        age: format_age(item["metadata"]["creationTimestamp"].as_str()),
        containers,
        node: item["spec"]["nodeName"].as_str().map(String::from),
        pod_ip: item["status"]["podIP"].as_str().map(String::from),
        ready: format!("{}/{}", ready, total),
    }
}

fn reduce_deployment(item: &Value) -> DeploymentInfo {
    let replicas = item["spec"]["replicas"].as_i64().unwrap_or(0);
    let available = item["status"]["availableReplicas"].as_i64();
    let unavailable = item["status"]["unavailableReplicas"].as_i64().unwrap_or(0);
    // unavailableReplicas can exceed spec replicas during a surge rollout.
    let ready = available.unwrap_or((replicas - unavailable).max(0));

    let selector = item["spec"]["selector"]["matchLabels"]
        .as_object()
        .map(|labels| {
            labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.as_str().unwrap_or("-")))
                .collect()
        })
        .unwrap_or_default();

    DeploymentInfo {
        name: item["metadata"]["name"].as_str().unwrap_or("-").to_string(),
        namespace: item["metadata"]["namespace"]
            .as_str()
            .unwrap_or("-")
            .to_string(),
        age: format_age(item["metadata"]["creationTimestamp"].as_str()),
        containers: container_images(&item["spec"]["template"]["spec"]["containers"]),
        selector,
        ready: format!("{}/{}", ready, replicas),
    }
}
