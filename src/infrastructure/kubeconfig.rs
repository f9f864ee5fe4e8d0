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

//! Kubeconfig retrieval, normalization, and context activation. Pasted
//! kubeconfigs arrive through channels that mangle URLs and reference
//! local tool paths that differ per machine; normalization repairs both.

use crate::cli::prompt::Prompter;
use crate::domain::settings::CloudKind;
use crate::infrastructure::secrets::{restrict_permissions, SecretStore};
use crate::shared::error::{Result, WizardError};
use serde_json::json;
use serde_yaml::Value;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use super::constants::GCLOUD_BIN_PATH;
use super::exec::CommandRunner;
use super::kubectl::Kubectl;
use super::telemetry::Telemetry;

/// Outcome of a successful kubeconfig setup.
pub struct ActiveCluster {
    pub cluster_name: String,
    pub kubeconfig_path: PathBuf,
}

pub struct KubeconfigManager<'a> {
    runner: &'a dyn CommandRunner,
    telemetry: &'a Telemetry,
    dir: PathBuf,
}

impl<'a> KubeconfigManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, telemetry: &'a Telemetry, dir: PathBuf) -> Self {
        Self {
            runner,
            telemetry,
            dir,
        }
    }

    /// Write the stored kubeconfig to disk (normalized) and activate a
    /// context from it. A kubeconfig that fails to parse or has no
    /// contexts loops back to re-supply rather than aborting the run.
    pub async fn setup(
        &self,
        prompter: &mut dyn Prompter,
        secrets: &mut SecretStore,
        cloud: CloudKind,
        secret_key: &str,
    ) -> Result<ActiveCluster> {
        let mut content = match secrets.get(secret_key) {
            Some(value) => value.to_string(),
            None => self.resupply(prompter, secrets, secret_key)?,
        };

        loop {
            match self.try_setup(prompter, cloud, &content).await {
                Ok(active) => return Ok(active),
                Err(WizardError::Kubeconfig(reason)) => {
                    warn!(%reason, "kubeconfig rejected");
                    println!("Please check that the kubeconfig has the correct format: {}", reason);
                    content = self.resupply(prompter, secrets, secret_key)?;
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn try_setup(
        &self,
        prompter: &mut dyn Prompter,
        cloud: CloudKind,
        content: &str,
    ) -> Result<ActiveCluster> {
        let normalized = normalize(content, cloud, self.telemetry)?;

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join("config");
        fs::write(&path, &normalized)?;
        restrict_permissions(&path)?;

        let kubectl = Kubectl::with_kubeconfig(self.runner, path.clone());
        let contexts = kubectl.contexts().await?;

        let cluster_name = if contexts.len() > 1 {
            prompter.select("Please select the cluster context to use", contexts)?
        } else {
            contexts[0].clone()
        };

        kubectl.activate_context(&cluster_name).await?;

        Ok(ActiveCluster {
            cluster_name,
            kubeconfig_path: path,
        })
    }

    fn resupply(
        &self,
        prompter: &mut dyn Prompter,
        secrets: &mut SecretStore,
        secret_key: &str,
    ) -> Result<String> {
        let content = prompter.editor("Please paste the kubeconfig for your cluster")?;
        secrets.set(secret_key, &content)?;
        Ok(content)
    }
}

/// Repair a pasted kubeconfig:
/// - strip `<`/`>` from the server URL (chat channels auto-link it),
/// - AWS: force the exec-credential env value to the `default` profile,
/// - GCP: pin the auth-provider cmd-path to the installed gcloud binary.
///
/// A document that is not valid YAML is a kubeconfig error; a document
/// missing the expected fields is passed through unchanged, matching how
/// unusual-but-valid kubeconfigs are tolerated.
pub fn normalize(content: &str, cloud: CloudKind, telemetry: &Telemetry) -> Result<String> {
    let mut config: Value = serde_yaml::from_str(content)
        .map_err(|e| WizardError::Kubeconfig(format!("not valid YAML: {}", e)))?;

    if !config.is_mapping() {
        return Err(WizardError::Kubeconfig(
            "expected a YAML mapping at the top level".to_string(),
        ));
    }

    if let Err(missing) = rewrite(&mut config, cloud) {
        telemetry.record(
            "kubeconfig_normalization_skipped",
            json!({"cloud": cloud.as_str(), "missing": missing}),
        );
    }

    serde_yaml::to_string(&config).map_err(Into::into)
}

/// Apply the rewrites in place; on the first missing field, report its
/// path and leave the rest of the document untouched.
fn rewrite(config: &mut Value, cloud: CloudKind) -> std::result::Result<(), String> {
    let server = lookup(config, &["clusters", "0", "cluster", "server"])
        .ok_or("clusters.0.cluster.server")?;
    if let Value::String(url) = server {
        *url = url.replace(['<', '>'], "");
    }

    match cloud {
        CloudKind::Aws => {
            let value = lookup(config, &["users", "0", "user", "exec", "env", "0", "value"])
                .ok_or("users.0.user.exec.env.0.value")?;
            *value = Value::String("default".to_string());
        }
        CloudKind::Gcp => {
            let value = lookup(
                config,
                &["users", "0", "user", "auth-provider", "config", "cmd-path"],
            )
            .ok_or("users.0.user.auth-provider.config.cmd-path")?;
            *value = Value::String(GCLOUD_BIN_PATH.to_string());
        }
    }
    Ok(())
}

fn lookup<'v>(root: &'v mut Value, path: &[&str]) -> Option<&'v mut Value> {
    let mut current = root;
    for segment in path {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get_mut(index)?,
            Err(_) => current.get_mut(*segment)?,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn telemetry(dir: &TempDir) -> Telemetry {
        Telemetry::at(dir.path().join("events.jsonl"))
    }

    const AWS_KUBECONFIG: &str = r#"
apiVersion: v1
clusters:
  - cluster:
      server: <https://ABC.gr7.eu-west-1.eks.amazonaws.com>
    name: prod
contexts:
  - context:
      cluster: prod
      user: prod
    name: prod
users:
  - name: prod
    user:
      exec:
        command: aws-iam-authenticator
        env:
          - name: AWS_PROFILE
            value: staging
"#;

    const GCP_KUBECONFIG: &str = r#"
apiVersion: v1
clusters:
  - cluster:
      server: https://10.0.0.1
    name: gke
users:
  - name: gke
    user:
      auth-provider:
        config:
          cmd-path: /home/me/google-cloud-sdk/bin/gcloud
"#;

    #[test]
    fn test_aws_normalization() {
        let dir = TempDir::new().unwrap();
        let out = normalize(AWS_KUBECONFIG, CloudKind::Aws, &telemetry(&dir)).unwrap();
        let config: Value = serde_yaml::from_str(&out).unwrap();

        assert_eq!(
            config["clusters"][0]["cluster"]["server"].as_str(),
            Some("https://ABC.gr7.eu-west-1.eks.amazonaws.com")
        );
        assert_eq!(
            config["users"][0]["user"]["exec"]["env"][0]["value"].as_str(),
            Some("default")
        );
    }

    #[test]
    fn test_gcp_cmd_path_pinned() {
        let dir = TempDir::new().unwrap();
        let out = normalize(GCP_KUBECONFIG, CloudKind::Gcp, &telemetry(&dir)).unwrap();
        let config: Value = serde_yaml::from_str(&out).unwrap();

        assert_eq!(
            config["users"][0]["user"]["auth-provider"]["config"]["cmd-path"].as_str(),
            Some("/usr/local/bin/google-cloud-sdk/bin/gcloud")
        );
    }

    #[test]
    fn test_invalid_yaml_is_a_kubeconfig_error() {
        let dir = TempDir::new().unwrap();
        let err = normalize(": not yaml : [", CloudKind::Aws, &telemetry(&dir)).unwrap_err();
        assert!(matches!(err, WizardError::Kubeconfig(_)));
    }

    #[test]
    fn test_unexpected_shape_passes_through() {
        let dir = TempDir::new().unwrap();
        let content = "apiVersion: v1\nclusters: []\n";
        let out = normalize(content, CloudKind::Aws, &telemetry(&dir)).unwrap();
        let config: Value = serde_yaml::from_str(&out).unwrap();
        assert!(config["clusters"].as_sequence().unwrap().is_empty());
    }
}
