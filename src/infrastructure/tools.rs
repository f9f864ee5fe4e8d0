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

//! Fixed catalog of helm-installable cluster add-ons and the batch
//! install/uninstall runner.

use crate::domain::settings::CloudKind;
use crate::shared::error::Result;
use std::path::PathBuf;
use tracing::info;

use super::constants::{NAMESPACE_KUBE_SYSTEM, NAMESPACE_MONITORING};
use super::exec::CommandRunner;
use super::helm::Helm;
use super::kubectl::Kubectl;

/// One catalog entry. The catalog is static; whether a tool is installed
/// is derived from the cluster per invocation, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub key: &'static str,
    pub display_name: &'static str,
    pub chart: &'static str,
    pub namespace: &'static str,
    pub set_options: Option<&'static str>,
    /// Namespace must exist before installing (monitoring stack lives
    /// outside kube-system).
    pub precreate_namespace: bool,
}

const NGINX_INGRESS: ToolSpec = ToolSpec {
    key: "nginx-ingress",
    display_name: "NGINX Ingress Controller",
    chart: "nginx-ingress",
    namespace: NAMESPACE_KUBE_SYSTEM,
    set_options: Some("rbac.create=true,serviceAccount.create=true"),
    precreate_namespace: false,
};

const PROMETHEUS: ToolSpec = ToolSpec {
    key: "prometheus",
    display_name: "Prometheus Monitoring System",
    chart: "prometheus",
    namespace: NAMESPACE_MONITORING,
    set_options: None,
    precreate_namespace: true,
};

const GRAFANA: ToolSpec = ToolSpec {
    key: "grafana",
    display_name: "Grafana Monitoring Dashboard",
    chart: "grafana",
    namespace: NAMESPACE_MONITORING,
    set_options: Some(r#"ingress.enabled=true,ingress.annotations."kubernetes\.io/ingress\.class"=nginx"#),
    precreate_namespace: true,
};

const KUBERNETES_DASHBOARD: ToolSpec = ToolSpec {
    key: "kubernetes-dashboard",
    display_name: "Kubernetes Dashboard",
    chart: "kubernetes-dashboard",
    namespace: NAMESPACE_KUBE_SYSTEM,
    set_options: Some("rbac.create=true,rbac.clusterAdminRole=true"),
    precreate_namespace: false,
};

const METRICS_SERVER: ToolSpec = ToolSpec {
    key: "metrics-server",
    display_name: "Metrics Server",
    chart: "metrics-server",
    namespace: NAMESPACE_KUBE_SYSTEM,
    set_options: None,
    precreate_namespace: false,
};

/// Tools offered for a cloud. The dashboard and metrics-server charts
/// are only supported on AWS clusters.
pub fn catalog(cloud: CloudKind) -> Vec<&'static ToolSpec> {
    match cloud {
        CloudKind::Aws => vec![
            &KUBERNETES_DASHBOARD,
            &METRICS_SERVER,
            &NGINX_INGRESS,
            &PROMETHEUS,
            &GRAFANA,
        ],
        CloudKind::Gcp => vec![&NGINX_INGRESS, &PROMETHEUS, &GRAFANA],
    }
}

pub fn find_tool(cloud: CloudKind, key: &str) -> Option<&'static ToolSpec> {
    catalog(cloud).into_iter().find(|tool| tool.key == key)
}

/// Result of one item in a batch. Failures are captured per item so one
/// bad tool never aborts the rest of the batch.
pub struct BatchResult {
    pub tool: &'static ToolSpec,
    pub outcome: Result<()>,
}

pub struct ToolManager<'a> {
    runner: &'a dyn CommandRunner,
    kubeconfig: Option<PathBuf>,
}

impl<'a> ToolManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            kubeconfig: None,
        }
    }

    /// Scope all helm/kubectl invocations to a managed kubeconfig.
    pub fn with_kubeconfig(runner: &'a dyn CommandRunner, kubeconfig: PathBuf) -> Self {
        Self {
            runner,
            kubeconfig: Some(kubeconfig),
        }
    }

    fn helm(&self) -> Helm<'a> {
        match &self.kubeconfig {
            Some(path) => Helm::with_kubeconfig(self.runner, path.clone()),
            None => Helm::new(self.runner),
        }
    }

    fn kubectl(&self) -> Kubectl<'a> {
        match &self.kubeconfig {
            Some(path) => Kubectl::with_kubeconfig(self.runner, path.clone()),
            None => Kubectl::new(self.runner),
        }
    }

    /// Keys from the catalog whose chart is already released on the
    /// cluster, regardless of release namespace.
    pub async fn installed_keys(&self, cloud: CloudKind) -> Result<Vec<&'static str>> {
        let releases = self.helm().list_releases().await?;
        Ok(catalog(cloud)
            .into_iter()
            .filter(|tool| releases.iter().any(|r| r.chart_name() == tool.chart))
            .map(|tool| tool.key)
            .collect())
    }

    /// Catalog entries that can be uninstalled: only what is currently
    /// released on the cluster.
    pub fn removable_candidates(
        cloud: CloudKind,
        installed: &[&str],
    ) -> Vec<&'static ToolSpec> {
        catalog(cloud)
            .into_iter()
            .filter(|tool| installed.contains(&tool.key))
            .collect()
    }

    /// Catalog entries still offerable for install: everything not yet
    /// released on the cluster.
    pub fn installable_candidates(
        cloud: CloudKind,
        installed: &[&str],
    ) -> Vec<&'static ToolSpec> {
        catalog(cloud)
            .into_iter()
            .filter(|tool| !installed.contains(&tool.key))
            .collect()
    }

    /// Install the selected tools in order, capturing each outcome. The
    /// stable repo is registered once up front.
    pub async fn install_batch(&self, tools: &[&'static ToolSpec]) -> Result<Vec<BatchResult>> {
        let helm = self.helm();
        let kubectl = self.kubectl();
        helm.ensure_stable_repo().await?;

        let mut results = Vec::with_capacity(tools.len());
        for &tool in tools {
            info!(tool = tool.key, "installing cluster tool");
            let outcome = self.install_one(&helm, &kubectl, tool).await;
            results.push(BatchResult { tool, outcome });
        }
        Ok(results)
    }

    async fn install_one(
        &self,
        helm: &Helm<'_>,
        kubectl: &Kubectl<'_>,
        tool: &ToolSpec,
    ) -> Result<()> {
        if tool.precreate_namespace {
            kubectl.create_namespace_if_absent(tool.namespace).await?;
        }
        helm.install(tool.key, tool.chart, tool.namespace, tool.set_options)
            .await?;
        Ok(())
    }

    pub async fn uninstall_batch(&self, tools: &[&'static ToolSpec]) -> Result<Vec<BatchResult>> {
        let helm = self.helm();

        let mut results = Vec::with_capacity(tools.len());
        for &tool in tools {
            info!(tool = tool.key, "uninstalling cluster tool");
            let outcome = helm.uninstall(tool.key, tool.namespace).await.map(|_| ());
            results.push(BatchResult { tool, outcome });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::exec::testing::ScriptedRunner;
    use crate::shared::error::WizardError;

    #[test]
    fn test_catalog_per_cloud() {
        let aws: Vec<_> = catalog(CloudKind::Aws).iter().map(|t| t.key).collect();
        let gcp: Vec<_> = catalog(CloudKind::Gcp).iter().map(|t| t.key).collect();

        assert!(aws.contains(&"kubernetes-dashboard"));
        assert!(aws.contains(&"metrics-server"));
        assert!(!gcp.contains(&"kubernetes-dashboard"));
        assert!(!gcp.contains(&"metrics-server"));
        for key in ["nginx-ingress", "prometheus", "grafana"] {
            assert!(aws.contains(&key));
            assert!(gcp.contains(&key));
        }
    }

    #[test]
    fn test_installed_tools_excluded_from_install_offer() {
        let installed = vec!["prometheus"];
        let offer: Vec<_> = ToolManager::installable_candidates(CloudKind::Gcp, &installed)
            .iter()
            .map(|t| t.key)
            .collect();

        assert_eq!(offer, vec!["nginx-ingress", "grafana"]);
    }

    #[test]
    fn test_uninstall_offer_limited_to_installed() {
        let installed = vec!["grafana", "nginx-ingress"];
        let offer: Vec<_> = ToolManager::removable_candidates(CloudKind::Gcp, &installed)
            .iter()
            .map(|t| t.key)
            .collect();

        assert_eq!(offer, vec!["nginx-ingress", "grafana"]);
    }

    #[tokio::test]
    async fn test_installed_keys_matches_on_chart_name() {
        let releases = r#"[
            {"name": "prometheus", "namespace": "monitoring",
             "chart": "prometheus-25.1.0", "status": "deployed"},
            {"name": "something-else", "namespace": "default",
             "chart": "redis-17.0.1", "status": "deployed"}
        ]"#;
        let runner = ScriptedRunner::new(vec![ScriptedRunner::stdout(releases)]);

        let installed = ToolManager::new(&runner)
            .installed_keys(CloudKind::Gcp)
            .await
            .unwrap();
        assert_eq!(installed, vec!["prometheus"]);
    }

    #[tokio::test]
    async fn test_install_batch_captures_failures_and_continues() {
        // repo add, repo update, prometheus ns + install, grafana ns + failing install
        let runner = ScriptedRunner::new(vec![
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout("installed prometheus"),
            ScriptedRunner::stdout(""),
            Err(WizardError::CommandFailed {
                program: "helm".to_string(),
                status: 1,
                stderr: "chart unavailable".to_string(),
            }),
        ]);

        let manager = ToolManager::new(&runner);
        let results = manager.install_batch(&[&PROMETHEUS, &GRAFANA]).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].outcome.is_ok());
        assert!(results[1].outcome.is_err());
    }

    #[tokio::test]
    async fn test_scoped_kubeconfig_reaches_batch_commands() {
        let runner = ScriptedRunner::new(vec![
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
        ]);

        let manager =
            ToolManager::with_kubeconfig(&runner, PathBuf::from("/tmp/session/config"));
        manager.install_batch(&[&PROMETHEUS]).await.unwrap();

        let calls = runner.recorded_calls();
        // Repo add/update are local; namespace creation and the install
        // itself must hit the session's cluster.
        assert!(calls
            .iter()
            .any(|c| c.starts_with("kubectl create namespace monitoring")
                && c.ends_with("--kubeconfig=/tmp/session/config")));
        assert!(calls
            .iter()
            .any(|c| c.starts_with("helm install prometheus")
                && c.ends_with("--kubeconfig=/tmp/session/config")));
    }

    #[tokio::test]
    async fn test_monitoring_namespace_precreated() {
        let runner = ScriptedRunner::new(vec![
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
        ]);

        let manager = ToolManager::new(&runner);
        manager.install_batch(&[&PROMETHEUS]).await.unwrap();

        let calls = runner.recorded_calls();
        assert!(calls.iter().any(|c| c == "kubectl create namespace monitoring"));
    }
}
