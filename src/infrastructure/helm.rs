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

//! Thin wrapper over the `helm` binary for the add-on catalog.

use crate::shared::error::{Result, WizardError};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;

use super::constants::{HELM_STABLE_REPO_NAME, HELM_STABLE_REPO_URL};
use super::exec::{CommandOutput, CommandRunner};

/// One installed release as reported by `helm ls`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelmRelease {
    pub name: String,
    pub namespace: String,
    pub chart: String,
    pub status: String,
}

impl HelmRelease {
    /// Chart name without its version suffix. `helm ls` reports
    /// `prometheus-25.1.0`; the catalog knows the tool as `prometheus`.
    pub fn chart_name(&self) -> &str {
        let version_start = Regex::new(r"-[0-9]")
            .ok()
            .and_then(|re| re.find(&self.chart))
            .map(|m| m.start());
        match version_start {
            Some(idx) => &self.chart[..idx],
            None => &self.chart,
        }
    }
}

pub struct Helm<'a> {
    runner: &'a dyn CommandRunner,
    kubeconfig: Option<PathBuf>,
}

impl<'a> Helm<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            kubeconfig: None,
        }
    }

    /// Scope every cluster-facing invocation to a managed kubeconfig
    /// instead of the operator's ambient `~/.kube/config`.
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
                self.runner.run("helm", &full).await
            }
            None => self.runner.run("helm", args).await,
        }
    }

    /// Ensure the stable chart repository is registered and refreshed.
    /// Installs are resolved against it. Repo management is local and
    /// never touches the cluster.
    pub async fn ensure_stable_repo(&self) -> Result<()> {
        self.runner
            .run(
                "helm",
                &[
                    "repo",
                    "add",
                    HELM_STABLE_REPO_NAME,
                    HELM_STABLE_REPO_URL,
                    "--force-update",
                ],
            )
            .await?;
        self.runner.run("helm", &["repo", "update"]).await?;
        Ok(())
    }

    pub async fn list_releases(&self) -> Result<Vec<HelmRelease>> {
        let output = self.run(&["ls", "--all-namespaces", "-o", "json"]).await?;
        serde_json::from_str(&output.stdout)
            .map_err(|e| WizardError::malformed_output("helm", e.to_string()))
    }

    pub async fn install(
        &self,
        name: &str,
        chart: &str,
        namespace: &str,
        set_options: Option<&str>,
    ) -> Result<String> {
        let chart_ref = format!("{}/{}", HELM_STABLE_REPO_NAME, chart);
        let mut args = vec!["install", name, chart_ref.as_str(), "--namespace", namespace];

        let set_flag;
        if let Some(options) = set_options {
            set_flag = format!("--set={}", options);
            args.push(&set_flag);
        }

        let output = self.run(&args).await?;
        Ok(output.stdout)
    }

    pub async fn uninstall(&self, name: &str, namespace: &str) -> Result<String> {
        let output = self
            .run(&["delete", name, "--namespace", namespace])
            .await?;
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::exec::testing::ScriptedRunner;

    fn release(chart: &str) -> HelmRelease {
        HelmRelease {
            name: "r".to_string(),
            namespace: "kube-system".to_string(),
            chart: chart.to_string(),
            status: "deployed".to_string(),
        }
    }

    #[test]
    fn test_chart_name_strips_version_suffix() {
        assert_eq!(release("prometheus-25.1.0").chart_name(), "prometheus");
        assert_eq!(
            release("nginx-ingress-1.41.3").chart_name(),
            "nginx-ingress"
        );
        assert_eq!(
            release("kubernetes-dashboard-7.0.0").chart_name(),
            "kubernetes-dashboard"
        );
    }

    #[test]
    fn test_chart_name_without_version() {
        assert_eq!(release("grafana").chart_name(), "grafana");
    }

    #[tokio::test]
    async fn test_list_releases_parses_helm_output() {
        let stdout = r#"[
            {"name": "prometheus", "namespace": "monitoring",
             "chart": "prometheus-25.1.0", "status": "deployed",
             "revision": "1", "app_version": "2.48.0"}
        ]"#;
        let runner = ScriptedRunner::new(vec![ScriptedRunner::stdout(stdout)]);

        let releases = Helm::new(&runner).list_releases().await.unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].chart_name(), "prometheus");
        assert_eq!(releases[0].namespace, "monitoring");
    }

    #[tokio::test]
    async fn test_install_with_set_options() {
        let runner = ScriptedRunner::new(vec![ScriptedRunner::stdout("installed")]);
        Helm::new(&runner)
            .install("grafana", "grafana", "monitoring", Some("ingress.enabled=true"))
            .await
            .unwrap();

        let calls = runner.recorded_calls();
        assert_eq!(
            calls[0],
            "helm install grafana stable/grafana --namespace monitoring --set=ingress.enabled=true"
        );
    }

    #[tokio::test]
    async fn test_scoped_kubeconfig_reaches_cluster_commands() {
        let runner = ScriptedRunner::new(vec![ScriptedRunner::stdout("[]")]);
        Helm::with_kubeconfig(&runner, PathBuf::from("/tmp/session/config"))
            .list_releases()
            .await
            .unwrap();

        assert_eq!(
            runner.recorded_calls()[0],
            "helm ls --all-namespaces -o json --kubeconfig=/tmp/session/config"
        );
    }

    #[tokio::test]
    async fn test_uninstall_scoped_to_namespace() {
        let runner = ScriptedRunner::new(vec![ScriptedRunner::stdout("released")]);
        Helm::new(&runner)
            .uninstall("prometheus", "monitoring")
            .await
            .unwrap();

        assert_eq!(
            runner.recorded_calls()[0],
            "helm delete prometheus --namespace monitoring"
        );
    }
}
