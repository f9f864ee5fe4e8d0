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

//! Decides, per application, whether to reuse configuration already on the
//! cluster, prompt for new values, or offer the choice between the two.

use crate::cli::prompt::{validated_text, Prompter};
use crate::shared::error::Result;
use colored::Colorize;

use super::settings::{
    is_valid_max_pods, is_valid_min_pods, is_valid_port, is_valid_replicas, is_valid_target_cpu,
    normalize_host, HpaSettings, PriorConfig,
};

pub struct ConfigResolver<'a> {
    prompter: &'a mut dyn Prompter,
    /// Attempt cap handed to every validated prompt; `None` retries
    /// until a valid answer or cancellation.
    max_attempts: Option<u32>,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(prompter: &'a mut dyn Prompter, max_attempts: Option<u32>) -> Self {
        Self {
            prompter,
            max_attempts,
        }
    }

    /// Resolve the deployment configuration for `app`. When prior
    /// configuration exists and the operator accepts it, it is returned
    /// unchanged and no value prompt runs.
    pub fn resolve_deploy(&mut self, app: &str, prior: Option<&PriorConfig>) -> Result<PriorConfig> {
        if let Some(prior) = prior {
            self.show_deploy_config(app, prior);
            if self
                .prompter
                .confirm("Would you like to proceed with these configurations?", true)?
            {
                return Ok(prior.clone());
            }
        }
        self.collect_deploy()
    }

    /// Resolve autoscaling configuration. Without prior HPA settings the
    /// choice is skipped and values are collected directly, after a
    /// reminder that the Metrics Server must be present.
    pub fn resolve_hpa(&mut self, app: &str, prior: Option<&PriorConfig>) -> Result<HpaSettings> {
        if let Some(hpa) = prior.and_then(|p| p.hpa) {
            self.show_hpa_config(app, &hpa);
            if self
                .prompter
                .confirm("Would you like to use these configurations?", true)?
            {
                return Ok(hpa);
            }
            return self.collect_hpa();
        }

        println!("\nLet's configure horizontal pod autoscaling for your application!");
        println!(
            "{} Please make sure the {} is installed in your cluster before continuing",
            "!".yellow(),
            "Metrics Server".magenta()
        );
        self.collect_hpa()
    }

    fn collect_deploy(&mut self) -> Result<PriorConfig> {
        let target_port = validated_text(
            self.prompter,
            "Enter the port your application will be running on (check your Dockerfile)",
            None,
            &is_valid_port,
            "Please enter a valid port input",
            self.max_attempts,
        )?;

        let port = validated_text(
            self.prompter,
            "Enter the port that the service can be accessed from",
            None,
            &is_valid_port,
            "Please enter a valid port input",
            self.max_attempts,
        )?;

        let replicas = validated_text(
            self.prompter,
            "Enter the number of replicas you would like to create for your application",
            Some("1"),
            &is_valid_replicas,
            "Please enter a number greater than 0",
            self.max_attempts,
        )?;

        let is_public = self.prompter.confirm(
            "Would you like your application to be accessible outside the cluster?",
            false,
        )?;

        let host = if is_public {
            let raw = self.prompter.text(
                "Enter the URL this application should be accessed from (e.g. api.yoursite.ca)",
                None,
            )?;
            Some(normalize_host(&raw))
        } else {
            None
        };

        Ok(PriorConfig {
            // Validators above guarantee these parse.
            target_port: target_port.trim().parse().unwrap_or_default(),
            port: port.trim().parse().unwrap_or_default(),
            replicas: replicas.trim().parse().unwrap_or_default(),
            is_public,
            host,
            hpa: None,
        })
    }

    fn collect_hpa(&mut self) -> Result<HpaSettings> {
        let min_pods = validated_text(
            self.prompter,
            "Enter the minimum number of replicas",
            Some("1"),
            &is_valid_min_pods,
            "The minimum number should be at least 1",
            self.max_attempts,
        )?;
        let min_pods: i32 = min_pods.trim().parse().unwrap_or(1);

        let max_pods = validated_text(
            self.prompter,
            "Enter the maximum number of replicas",
            Some("2"),
            &|v| is_valid_max_pods(v, min_pods),
            "The maximum number of replicas should be greater than the minimum number",
            self.max_attempts,
        )?;

        let target_cpu = validated_text(
            self.prompter,
            "Enter the target CPU utilization percentage",
            Some("50"),
            &is_valid_target_cpu,
            "The value must be strictly between 0 and 100",
            self.max_attempts,
        )?;

        Ok(HpaSettings {
            min_pods,
            max_pods: max_pods.trim().parse().unwrap_or_default(),
            target_cpu_percent: target_cpu.trim().parse().unwrap_or_default(),
        })
    }

    fn show_deploy_config(&self, app: &str, config: &PriorConfig) {
        println!(
            "\nHere are the current deployment configurations for {}:",
            app.magenta()
        );
        println!(" - Application Port: {}", config.target_port.to_string().magenta());
        println!(" - Service Port: {}", config.port.to_string().magenta());
        println!(" - Replicas: {}", config.replicas.to_string().magenta());
        println!(
            " - Publicly accessible: {}",
            config.is_public.to_string().magenta()
        );
        if let Some(host) = &config.host {
            println!(" - Host: {}", host.magenta());
        }
    }

    fn show_hpa_config(&self, app: &str, hpa: &HpaSettings) {
        println!(
            "\nHere are the current autoscaling configurations for {}:",
            app.magenta()
        );
        println!(" - Minimum # pods: {}", hpa.min_pods.to_string().magenta());
        println!(" - Maximum # pods: {}", hpa.max_pods.to_string().magenta());
        println!(
            " - Target CPU utilization: {}",
            hpa.target_cpu_percent.to_string().magenta()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::scripted::{Answer, ScriptedPrompter};

    fn prior() -> PriorConfig {
        PriorConfig {
            target_port: 8080,
            port: 80,
            replicas: 3,
            is_public: true,
            host: Some("api.example.com".to_string()),
            hpa: Some(HpaSettings {
                min_pods: 1,
                max_pods: 4,
                target_cpu_percent: 60,
            }),
        }
    }

    #[test]
    fn test_accepted_prior_config_returned_unchanged() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Confirm(true)]);
        let existing = prior();

        let mut resolver = ConfigResolver::new(&mut prompter, None);
        let resolved = resolver.resolve_deploy("api", Some(&existing)).unwrap();

        assert_eq!(resolved, existing);
        // Only the reuse confirmation ran; no value prompts.
        assert_eq!(prompter.asked.len(), 1);
    }

    #[test]
    fn test_rejected_prior_config_prompts_for_values() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Confirm(false),
            Answer::Text("3000".into()),
            Answer::Text("80".into()),
            Answer::Text("2".into()),
            Answer::Confirm(false),
        ]);

        let existing = prior();
        let mut resolver = ConfigResolver::new(&mut prompter, None);
        let resolved = resolver.resolve_deploy("api", Some(&existing)).unwrap();

        assert_eq!(resolved.target_port, 3000);
        assert_eq!(resolved.port, 80);
        assert_eq!(resolved.replicas, 2);
        assert!(!resolved.is_public);
        assert!(resolved.host.is_none());
    }

    #[test]
    fn test_no_prior_config_prompts_directly() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("8080".into()),
            Answer::Text("80".into()),
            Answer::Text("1".into()),
            Answer::Confirm(true),
            Answer::Text("http://api.example.com".into()),
        ]);

        let mut resolver = ConfigResolver::new(&mut prompter, None);
        let resolved = resolver.resolve_deploy("api", None).unwrap();

        assert!(resolved.is_public);
        assert_eq!(resolved.host.as_deref(), Some("api.example.com"));
    }

    #[test]
    fn test_hpa_reuse_path() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Confirm(true)]);
        let existing = prior();

        let mut resolver = ConfigResolver::new(&mut prompter, None);
        let hpa = resolver.resolve_hpa("api", Some(&existing)).unwrap();

        assert_eq!(hpa, existing.hpa.unwrap());
        assert_eq!(prompter.asked.len(), 1);
    }

    #[test]
    fn test_hpa_max_pods_validated_against_min() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("2".into()),
            Answer::Text("2".into()), // rejected: not > min
            Answer::Text("5".into()),
            Answer::Text("70".into()),
        ]);

        let mut resolver = ConfigResolver::new(&mut prompter, None);
        let hpa = resolver.resolve_hpa("api", None).unwrap();

        assert_eq!(hpa.min_pods, 2);
        assert_eq!(hpa.max_pods, 5);
        assert_eq!(hpa.target_cpu_percent, 70);
    }

    #[test]
    fn test_no_prior_hpa_skips_reuse_offer() {
        let without_hpa = PriorConfig {
            hpa: None,
            ..prior()
        };
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("1".into()),
            Answer::Text("3".into()),
            Answer::Text("50".into()),
        ]);

        let mut resolver = ConfigResolver::new(&mut prompter, None);
        let hpa = resolver.resolve_hpa("api", Some(&without_hpa)).unwrap();

        assert_eq!(hpa.min_pods, 1);
        // First question is a value prompt, not a confirmation.
        assert!(prompter.asked[0].contains("minimum number of replicas"));
    }
}
