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

use crate::cli::prompt::Prompter;
use crate::infrastructure::constants::{AWS_PROFILE, AWS_REGIONS};
use crate::shared::error::{Result, WizardError};
use serde_json::json;

use super::AuthContext;

const SECRET_ACCOUNT_NUMBER: &str = "AWS_ACCOUNT_NUMBER";
const SECRET_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const SECRET_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// AWS sessions authenticate with an access key pair written to the
/// `default` profile; the kubeconfig's exec-credential entry resolves the
/// same profile.
#[derive(Debug)]
pub struct AwsProvider {
    account_number: String,
    region: String,
}

impl AwsProvider {
    pub fn new() -> Self {
        Self {
            account_number: String::new(),
            region: String::new(),
        }
    }

    pub fn regions(&self) -> &'static [&'static str] {
        AWS_REGIONS
    }

    pub fn env_vars(&self) -> String {
        format!("AWS_PROFILE={}", AWS_PROFILE)
    }

    pub async fn authenticate(
        &mut self,
        prompter: &mut dyn Prompter,
        ctx: &mut AuthContext<'_>,
    ) -> Result<()> {
        let account_number = stored_or_asked(prompter, ctx, SECRET_ACCOUNT_NUMBER, false)?;
        let access_key = stored_or_asked(prompter, ctx, SECRET_ACCESS_KEY_ID, false)?;
        let secret_key = stored_or_asked(prompter, ctx, SECRET_SECRET_ACCESS_KEY, true)?;

        let region = if self.region.is_empty() {
            prompter.select(
                "Please select the region your cluster resides in",
                AWS_REGIONS.iter().map(|r| r.to_string()).collect(),
            )?
        } else {
            self.region.clone()
        };

        self.save_creds(ctx, &region, &access_key, &secret_key).await?;

        self.account_number = account_number;
        self.region = region;

        ctx.telemetry.record(
            "configure_aws",
            json!({
                "account_number": self.account_number,
                "region": self.region,
            }),
        );
        Ok(())
    }

    /// `aws configure` writes the profile files the kubeconfig's
    /// exec-credential plugin reads later.
    async fn save_creds(
        &self,
        ctx: &AuthContext<'_>,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<()> {
        for (key, value) in [
            ("region", region),
            ("aws_access_key_id", access_key),
            ("aws_secret_access_key", secret_key),
        ] {
            ctx.runner
                .run(
                    "aws",
                    &["configure", "--profile", AWS_PROFILE, "set", key, value],
                )
                .await?;
        }
        Ok(())
    }

    /// Preset the region, suppressing the interactive pick.
    pub fn set_region(&mut self, region: String) {
        self.region = region;
    }

    pub fn region(&self) -> Result<String> {
        if self.region.is_empty() {
            return Err(WizardError::config_error(
                "AWS region requested before authentication",
            ));
        }
        Ok(self.region.clone())
    }
}

impl Default for AwsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch a secret from the store, asking the operator and persisting the
/// answer on a miss. `masked` hides the answer while it is typed.
fn stored_or_asked(
    prompter: &mut dyn Prompter,
    ctx: &mut AuthContext<'_>,
    key: &str,
    masked: bool,
) -> Result<String> {
    if let Some(value) = ctx.secrets.get(key) {
        return Ok(value.to_string());
    }
    let message = format!("Please enter your {}", key);
    let value = if masked {
        prompter.password(&message)?
    } else {
        prompter.text(&message, None)?
    };
    ctx.secrets.set(key, &value)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::scripted::{Answer, ScriptedPrompter};
    use crate::infrastructure::exec::testing::ScriptedRunner;
    use crate::infrastructure::secrets::SecretStore;
    use crate::infrastructure::telemetry::Telemetry;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_authenticate_writes_profile_and_persists_secrets() {
        let dir = TempDir::new().unwrap();
        let mut secrets = SecretStore::open(dir.path().join("secrets.json")).unwrap();
        let telemetry = Telemetry::at(dir.path().join("events.jsonl"));
        let runner = ScriptedRunner::new(vec![
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
        ]);

        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("123456789012".into()),
            Answer::Text("AKIA123".into()),
            Answer::Text("secret".into()),
            Answer::Select("eu-west-1".into()),
        ]);

        let mut provider = AwsProvider::new();
        {
            let mut ctx = AuthContext {
                runner: &runner,
                secrets: &mut secrets,
                telemetry: &telemetry,
            };
            provider.authenticate(&mut prompter, &mut ctx).await.unwrap();
        }

        assert_eq!(provider.region().unwrap(), "eu-west-1");
        assert_eq!(provider.env_vars(), "AWS_PROFILE=default");
        assert_eq!(secrets.get("AWS_ACCESS_KEY_ID"), Some("AKIA123"));

        let calls = runner.recorded_calls();
        assert_eq!(
            calls[0],
            "aws configure --profile default set region eu-west-1"
        );
        assert_eq!(
            calls[1],
            "aws configure --profile default set aws_access_key_id AKIA123"
        );
    }

    #[tokio::test]
    async fn test_stored_secrets_skip_prompting() {
        let dir = TempDir::new().unwrap();
        let mut secrets = SecretStore::open(dir.path().join("secrets.json")).unwrap();
        secrets.set("AWS_ACCOUNT_NUMBER", "123").unwrap();
        secrets.set("AWS_ACCESS_KEY_ID", "AKIA").unwrap();
        secrets.set("AWS_SECRET_ACCESS_KEY", "s").unwrap();
        let telemetry = Telemetry::at(dir.path().join("events.jsonl"));
        let runner = ScriptedRunner::new(vec![
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
        ]);

        // Only the region question remains.
        let mut prompter = ScriptedPrompter::new(vec![Answer::Select("us-east-1".into())]);

        let mut provider = AwsProvider::new();
        let mut ctx = AuthContext {
            runner: &runner,
            secrets: &mut secrets,
            telemetry: &telemetry,
        };
        provider.authenticate(&mut prompter, &mut ctx).await.unwrap();

        assert_eq!(prompter.asked.len(), 1);
    }

    #[tokio::test]
    async fn test_preset_region_suppresses_region_pick() {
        let dir = TempDir::new().unwrap();
        let mut secrets = SecretStore::open(dir.path().join("secrets.json")).unwrap();
        secrets.set("AWS_ACCOUNT_NUMBER", "123").unwrap();
        secrets.set("AWS_ACCESS_KEY_ID", "AKIA").unwrap();
        secrets.set("AWS_SECRET_ACCESS_KEY", "s").unwrap();
        let telemetry = Telemetry::at(dir.path().join("events.jsonl"));
        let runner = ScriptedRunner::new(vec![
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
            ScriptedRunner::stdout(""),
        ]);

        let mut prompter = ScriptedPrompter::new(vec![]);

        let mut provider = AwsProvider::new();
        provider.set_region("eu-central-1".to_string());
        let mut ctx = AuthContext {
            runner: &runner,
            secrets: &mut secrets,
            telemetry: &telemetry,
        };
        provider.authenticate(&mut prompter, &mut ctx).await.unwrap();

        assert!(prompter.asked.is_empty());
        assert_eq!(provider.region().unwrap(), "eu-central-1");
        assert_eq!(
            runner.recorded_calls()[0],
            "aws configure --profile default set region eu-central-1"
        );
    }

    #[test]
    fn test_region_before_authentication_is_an_error() {
        assert!(AwsProvider::new().region().is_err());
    }
}
