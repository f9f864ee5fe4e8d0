//! Top-level action router: a menu-driven loop that establishes a cloud
//! session once, then runs one action at a time until the operator is done.

use crate::domain::resolver::ConfigResolver;
use crate::domain::settings::{
    is_valid_app_name, is_valid_image, normalize_image, CloudKind, DeploySettings, SessionContext,
};
use crate::infrastructure::cloud::{AuthContext, Provider};
use crate::infrastructure::constants::{
    ALL_NAMESPACES, MANIFEST_FILE_NAME, RESOURCE_TYPES,
};
use crate::infrastructure::exec::CommandRunner;
use crate::infrastructure::kubeconfig::KubeconfigManager;
use crate::infrastructure::kubectl::Kubectl;
use crate::infrastructure::manifest::render_bundle;
use crate::infrastructure::secrets::{config_dir, kubeconfig_key, SecretStore};
use crate::infrastructure::telemetry::Telemetry;
use crate::infrastructure::tools::{BatchResult, ToolManager, ToolSpec};
use crate::shared::error::{Result, WizardError};
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use tracing::{info, warn};

use super::display::TableRenderer;
use super::prompt::{validated_text, Prompter};

const ACTION_CONFIGURE: &str = "Configure cluster [START HERE]";
const ACTION_LIST: &str = "List resources";
const ACTION_DEPLOY: &str = "Deploy an application";
const ACTION_INSTALL: &str = "Install K8s tools";
const ACTION_UNINSTALL: &str = "Uninstall K8s tools";
const ACTION_YAML: &str = "Create resources from YAML";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Configure,
    List,
    Deploy,
    Install,
    Uninstall,
    Yaml,
}

impl Action {
    fn menu() -> Vec<String> {
        [
            ACTION_CONFIGURE,
            ACTION_LIST,
            ACTION_DEPLOY,
            ACTION_INSTALL,
            ACTION_UNINSTALL,
            ACTION_YAML,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn from_label(label: &str) -> Result<Self> {
        match label {
            ACTION_CONFIGURE => Ok(Self::Configure),
            ACTION_LIST => Ok(Self::List),
            ACTION_DEPLOY => Ok(Self::Deploy),
            ACTION_INSTALL => Ok(Self::Install),
            ACTION_UNINSTALL => Ok(Self::Uninstall),
            ACTION_YAML => Ok(Self::Yaml),
            other => Err(WizardError::config_error(format!(
                "unknown action: {}",
                other
            ))),
        }
    }
}

pub struct Wizard<'a> {
    prompter: &'a mut dyn Prompter,
    runner: &'a dyn CommandRunner,
    secrets: SecretStore,
    telemetry: Telemetry,
    max_attempts: Option<u32>,
    preset_cloud: Option<String>,
    preset_region: Option<String>,
}

impl<'a> Wizard<'a> {
    pub fn new(
        prompter: &'a mut dyn Prompter,
        runner: &'a dyn CommandRunner,
        secrets: SecretStore,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            prompter,
            runner,
            secrets,
            telemetry,
            max_attempts: None,
            preset_cloud: None,
            preset_region: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_preset_cloud(mut self, cloud: Option<String>) -> Self {
        self.preset_cloud = cloud;
        self
    }

    pub fn with_preset_region(mut self, region: Option<String>) -> Self {
        self.preset_region = region;
        self
    }

    /// Run the wizard until the operator declines another action. Only
    /// credential errors and cancellation terminate the loop early; any
    /// other action failure is reported and control returns to the menu.
    pub async fn run(&mut self) -> Result<()> {
        let cloud_name = match self.preset_cloud.take() {
            Some(name) => name,
            None => self.prompter.select(
                "Please select the cloud provider hosting your cluster",
                vec!["AWS".to_string(), "GCP".to_string()],
            )?,
        };
        let mut provider = Provider::from_name(&cloud_name)?;
        let cloud = provider.kind();

        println!(
            "\n{} Welcome to the {} manager for {} clusters!",
            "⚙".cyan(),
            "Kubernetes".bold(),
            cloud.as_str().magenta()
        );
        println!(
            "\n{} This wizard requires some setup. Here's what you'll need:",
            "!".yellow()
        );
        for item in setup_checklist(cloud) {
            println!(" ➡  {}", item);
        }
        self.telemetry
            .record("selected_cloud", json!({"cloud": cloud.as_str()}));

        if let Some(region) = &self.preset_region {
            provider.set_region(region.clone());
        }

        {
            let mut ctx = AuthContext {
                runner: self.runner,
                secrets: &mut self.secrets,
                telemetry: &self.telemetry,
            };
            provider.authenticate(&mut *self.prompter, &mut ctx).await?;
        }
        println!(
            "\nTo use this session from your own shell, export: {}",
            provider.env_vars().green()
        );

        let mut region = self.preset_region.take();
        let mut secret_key: Option<String> = None;

        loop {
            let label = self
                .prompter
                .select("What would you like to do?", Action::menu())?;
            let action = Action::from_label(&label)?;

            if region.is_none() {
                region = Some(provider.region(&mut *self.prompter)?);
            }
            let region_name = region.clone().unwrap_or_default();

            match self
                .run_action(action, cloud, &region_name, &mut secret_key)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(WizardError::Cancelled) => return Err(WizardError::Cancelled),
                Err(e) => {
                    println!("{}", e.to_string().red());
                    self.telemetry
                        .record("action_failed", json!({"error": e.to_string()}));
                }
            }

            if !self
                .prompter
                .confirm("Would you like to perform another action?", true)?
            {
                return Ok(());
            }
        }
    }

    async fn run_action(
        &mut self,
        action: Action,
        cloud: CloudKind,
        region: &str,
        secret_key: &mut Option<String>,
    ) -> Result<()> {
        if action == Action::Configure {
            return self.configure(cloud, secret_key);
        }

        let key = match secret_key {
            Some(key) => key.clone(),
            None => self.resolve_secret_key(cloud)?,
        };
        *secret_key = Some(key.clone());

        let manager =
            KubeconfigManager::new(self.runner, &self.telemetry, config_dir()?.join("kube"));
        let active = manager
            .setup(&mut *self.prompter, &mut self.secrets, cloud, &key)
            .await?;

        let session = SessionContext {
            cloud,
            region: region.to_string(),
            credentials_ref: key,
            kubeconfig_path: active.kubeconfig_path,
            cluster_name: active.cluster_name,
        };
        info!(cluster = %session.cluster_name, action = ?action, "running action");

        match action {
            Action::Configure => unreachable!("handled above"),
            Action::List => self.list(&session).await,
            Action::Deploy => self.deploy(&session).await,
            Action::Install => self.install(&session).await,
            Action::Uninstall => self.uninstall(&session).await,
            Action::Yaml => self.apply_yaml(&session).await,
        }
    }

    /// Pick which saved kubeconfig to use. With several stored for this
    /// cloud the operator chooses; with none the cluster name is asked so
    /// setup can fall through to pasting a fresh kubeconfig.
    fn resolve_secret_key(&mut self, cloud: CloudKind) -> Result<String> {
        let saved: Vec<String> = self
            .secrets
            .kubeconfig_keys(cloud.as_str())
            .into_iter()
            .map(String::from)
            .collect();

        match saved.len() {
            0 => {
                let cluster = self.prompter.text(
                    "Enter the name of the cluster whose saved kubeconfig should be used",
                    None,
                )?;
                Ok(kubeconfig_key(cluster.trim(), cloud.as_str()))
            }
            1 => Ok(saved.into_iter().next().unwrap_or_default()),
            _ => self
                .prompter
                .select("Please select the cluster you would like to use", saved),
        }
    }

    /// Save a pasted kubeconfig under the cluster's secret key.
    fn configure(&mut self, cloud: CloudKind, secret_key: &mut Option<String>) -> Result<()> {
        let cluster = validated_text(
            &mut *self.prompter,
            "Enter a name for the cluster this kubeconfig belongs to",
            None,
            &is_valid_app_name,
            "Invalid name; please only include letters, numbers, dashes, or underscores in your answer",
            self.max_attempts,
        )?;
        let key = kubeconfig_key(cluster.trim(), cloud.as_str());

        let kubeconfig = self
            .prompter
            .editor("Please paste the kubeconfig for your cluster")?;
        self.secrets.set(&key, &kubeconfig)?;

        println!(
            "\nCluster config successfully saved as secret {}!",
            key.magenta()
        );
        *secret_key = Some(key);
        Ok(())
    }

    async fn list(&mut self, session: &SessionContext) -> Result<()> {
        let kubectl = Kubectl::with_kubeconfig(self.runner, session.kubeconfig_path.clone());

        let mut options = vec![ALL_NAMESPACES.to_string()];
        options.extend(kubectl.namespaces().await?);
        let choice = self
            .prompter
            .select("Select the namespace to list resources from", options)?;
        let namespace = (choice != ALL_NAMESPACES).then_some(choice.as_str());

        let resource_type = self.prompter.select(
            "Select the resource type to list",
            RESOURCE_TYPES.iter().map(|s| s.to_string()).collect(),
        )?;

        let renderer = TableRenderer::new();
        match resource_type.as_str() {
            "pods" => {
                let pods = kubectl.pods(namespace).await?;
                println!("{}", renderer.render_pods(&pods));
            }
            "deployments" => {
                let deployments = kubectl.deployments(namespace).await?;
                println!("{}", renderer.render_deployments(&deployments));
            }
            other => {
                return Err(WizardError::config_error(format!(
                    "unknown resource type: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    async fn deploy(&mut self, session: &SessionContext) -> Result<()> {
        let kubectl = Kubectl::with_kubeconfig(self.runner, session.kubeconfig_path.clone());

        let namespaces = kubectl.namespaces().await?;
        let namespace = self.prompter.select(
            "Select the namespace you would like to deploy an application to",
            namespaces,
        )?;

        let apps = kubectl.apps(&namespace).await?;
        if !apps.is_empty() {
            println!(
                "\nHere are the existing applications in the {} namespace:",
                namespace.magenta()
            );
            for app in &apps {
                println!(" - {}", app);
            }
        }

        let app = validated_text(
            &mut *self.prompter,
            "Enter the name of the application you would like to deploy",
            None,
            &is_valid_app_name,
            "Invalid name; please only include letters, numbers, dashes, or underscores in your answer",
            self.max_attempts,
        )?
        .trim()
        .to_string();
        let exists = apps.iter().any(|existing| existing == &app);

        if exists {
            println!("\nHere are your most recent deployments to {}:", app.magenta());
            for revision in kubectl.rollout_history(&namespace, &app).await? {
                println!(" - {}  {}", revision.number, revision.change_cause.magenta());
            }
        }

        let image_raw = validated_text(
            &mut *self.prompter,
            "Enter the URL for the image (format: <REGISTRY-URL>/<IMAGE-NAME>:<IMAGE-TAG>)",
            None,
            &is_valid_image,
            "Please enter a valid image name/URL",
            self.max_attempts,
        )?;
        let image = normalize_image(image_raw.trim());

        let prior = if exists {
            Some(kubectl.prior_config(&namespace, &app).await?)
        } else {
            None
        };

        let config = ConfigResolver::new(&mut *self.prompter, self.max_attempts)
            .resolve_deploy(&app, prior.as_ref())?;

        let configure_hpa = self.prompter.confirm(
            "Would you like to configure horizontal pod autoscaling?",
            false,
        )?;
        let hpa = if configure_hpa {
            Some(
                ConfigResolver::new(&mut *self.prompter, self.max_attempts)
                    .resolve_hpa(&app, prior.as_ref())?,
            )
        } else {
            None
        };

        let settings = DeploySettings {
            namespace: namespace.clone(),
            app_name: app.clone(),
            image,
            target_port: config.target_port,
            port: config.port,
            replicas: config.replicas,
            is_public: config.is_public,
            host: config.host,
        };

        self.show_deploy_summary(session, &settings, hpa.as_ref());
        if !self
            .prompter
            .confirm("Would you like to proceed with the deployment?", true)?
        {
            return Ok(());
        }

        println!("{}", "Deploying application...".green().bold());
        let bundle = render_bundle(&settings, hpa.as_ref())?;
        let path = config_dir()?.join(MANIFEST_FILE_NAME);
        fs::write(&path, bundle)?;

        let output = kubectl.apply_file(&path, Some(&namespace)).await?;
        println!("{}", output.green());
        println!("{}", "Application successfully deployed!".green().bold());
        if let Some(host) = &settings.host {
            println!(
                "Your application can be found at {}",
                format!("http://{}", host).magenta()
            );
        }

        self.telemetry.record(
            "application_deployed",
            json!({"app": app, "namespace": namespace, "cluster": session.cluster_name}),
        );
        Ok(())
    }

    async fn install(&mut self, session: &SessionContext) -> Result<()> {
        let manager =
            ToolManager::with_kubeconfig(self.runner, session.kubeconfig_path.clone());
        let installed = manager.installed_keys(session.cloud).await?;
        for tool in ToolManager::removable_candidates(session.cloud, &installed) {
            println!("{}", skip_notice(tool, true));
        }
        let candidates = ToolManager::installable_candidates(session.cloud, &installed);

        let Some(selected) = self.pick_tools("install", &candidates)? else {
            return Ok(());
        };
        self.show_tool_summary(session, "installed", &selected);
        if !self.prompter.confirm("Please confirm the installation", true)? {
            return Ok(());
        }

        println!("{}", "Installing K8s tools...".green().bold());
        let results = manager.install_batch(&selected).await?;
        self.report_batch("install", session, &results);
        Ok(())
    }

    async fn uninstall(&mut self, session: &SessionContext) -> Result<()> {
        println!(
            "{}",
            "Uninstalling K8s tools is irreversible! Please proceed with caution"
                .red()
                .bold()
        );

        let manager =
            ToolManager::with_kubeconfig(self.runner, session.kubeconfig_path.clone());
        let installed = manager.installed_keys(session.cloud).await?;
        for tool in ToolManager::installable_candidates(session.cloud, &installed) {
            println!("{}", skip_notice(tool, false));
        }
        let candidates = ToolManager::removable_candidates(session.cloud, &installed);

        let Some(selected) = self.pick_tools("uninstall", &candidates)? else {
            return Ok(());
        };
        self.show_tool_summary(session, "uninstalled", &selected);
        if !self.prompter.confirm("Please confirm the deletion", true)? {
            return Ok(());
        }

        println!("{}", "Uninstalling K8s tools...".red().bold());
        let results = manager.uninstall_batch(&selected).await?;
        self.report_batch("uninstall", session, &results);
        Ok(())
    }

    /// Apply arbitrary pasted YAML. Invalid documents are rejected with
    /// the offending location before anything reaches the cluster.
    async fn apply_yaml(&mut self, session: &SessionContext) -> Result<()> {
        let mut attempts = 0u32;
        let content = loop {
            let pasted = self.prompter.editor(
                "Please paste the contents of the YAML file that contains your resource configurations",
            )?;
            // Pasted manifests arrive through channels that auto-link bare
            // hostnames; strip the artifact before validating.
            let content = pasted.replace("http://", "");
            match check_yaml(&content) {
                Ok(()) => break content,
                Err(reason) => {
                    println!("{}", format!("Invalid YAML: {}", reason).red());
                    attempts += 1;
                    if let Some(max) = self.max_attempts {
                        if attempts >= max {
                            return Err(WizardError::Validation(format!(
                                "no valid YAML after {} attempts",
                                max
                            )));
                        }
                    }
                }
            }
        };

        let path = config_dir()?.join(MANIFEST_FILE_NAME);
        fs::write(&path, content)?;

        let kubectl = Kubectl::with_kubeconfig(self.runner, session.kubeconfig_path.clone());
        let output = kubectl.apply_file(&path, None).await?;
        println!("{}", output.green());
        println!("{}", "Resource(s) created/updated!".green());

        self.telemetry.record(
            "resources_created_from_yaml",
            json!({"cluster": session.cluster_name}),
        );
        Ok(())
    }

    /// Offer a multi-select over the candidate tools; `None` means there
    /// is nothing to do (empty candidates or empty selection).
    fn pick_tools(
        &mut self,
        verb: &str,
        candidates: &[&'static ToolSpec],
    ) -> Result<Option<Vec<&'static ToolSpec>>> {
        if candidates.is_empty() {
            println!("\nNo tools to {}", verb);
            return Ok(None);
        }

        let chosen_names = self.prompter.multi_select(
            &format!("Select the tools you would like to {}", verb),
            candidates.iter().map(|t| t.display_name.to_string()).collect(),
        )?;

        let selected: Vec<&'static ToolSpec> = candidates
            .iter()
            .filter(|tool| chosen_names.iter().any(|name| name == tool.display_name))
            .copied()
            .collect();

        if selected.is_empty() {
            println!("\nNo tools to {}", verb);
            return Ok(None);
        }
        Ok(Some(selected))
    }

    fn show_tool_summary(&self, session: &SessionContext, verb: &str, tools: &[&ToolSpec]) {
        println!(
            "\nThe following tools will be {} on {} ({}):",
            verb,
            session.cluster_name.magenta(),
            session.region
        );
        for tool in tools {
            println!(" - {} in namespace {}", tool.display_name, tool.namespace);
        }
    }

    fn report_batch(&self, verb: &str, session: &SessionContext, results: &[BatchResult]) {
        for result in results {
            match &result.outcome {
                Ok(()) => {
                    println!(
                        "{}",
                        format!("Successfully {}ed {}", verb, result.tool.display_name).green()
                    );
                    self.telemetry.record(
                        &format!("tool_{}ed", verb),
                        json!({"tool": result.tool.key, "cluster": session.cluster_name}),
                    );
                }
                Err(e) => {
                    warn!(tool = result.tool.key, error = %e, "batch item failed");
                    println!(
                        "{}",
                        format!("Failed to {} {}: {}", verb, result.tool.display_name, e).red()
                    );
                    self.telemetry.record(
                        &format!("tool_{}_failed", verb),
                        json!({"tool": result.tool.key, "error": e.to_string()}),
                    );
                }
            }
        }
    }

    fn show_deploy_summary(
        &self,
        session: &SessionContext,
        settings: &DeploySettings,
        hpa: Option<&crate::domain::settings::HpaSettings>,
    ) {
        println!("\nAbout to deploy to {} ({}):", session.cluster_name.magenta(), session.region);
        println!(" - Application: {}", settings.app_name.magenta());
        println!(" - Image: {}", settings.image.magenta());
        println!(" - Namespace: {}", settings.namespace.magenta());
        println!(
            " - Ports: service {} -> container {}",
            settings.port, settings.target_port
        );
        println!(" - Replicas: {}", settings.replicas);
        println!(" - Publicly accessible: {}", settings.is_public);
        if let Some(host) = &settings.host {
            println!(" - Host: {}", host.magenta());
        }
        if let Some(hpa) = hpa {
            println!(
                " - Autoscaling: {}..{} pods at {}% CPU",
                hpa.min_pods, hpa.max_pods, hpa.target_cpu_percent
            );
        }
    }
}

/// Pre-flight checklist shown after provider selection, before any
/// credential prompt.
pub fn setup_checklist(cloud: CloudKind) -> &'static [&'static str] {
    match cloud {
        CloudKind::Aws => &[
            "AWS credentials (Account Number, Access Key ID, Secret Access Key)",
            "The AWS region where your cluster is created",
            "The kubeconfig for your cluster",
        ],
        CloudKind::Gcp => &[
            "GCP service account credentials (JSON)",
            "The GCP region where your cluster is created",
            "The kubeconfig for your cluster",
        ],
    }
}

/// Notice for a tool excluded from the current batch offer. Both the
/// install and uninstall sides name the release namespace.
fn skip_notice(tool: &ToolSpec, installed: bool) -> String {
    let state = if installed {
        "already installed"
    } else {
        "not installed"
    };
    format!(
        "{} is {} in the {} namespace; skipping",
        tool.display_name.magenta(),
        state,
        tool.namespace
    )
}

/// Validate every document in a YAML stream, reporting the location of
/// the first failure.
pub fn check_yaml(content: &str) -> std::result::Result<(), String> {
    if content.trim().is_empty() {
        return Err("the document is empty".to_string());
    }
    for document in serde_yaml::Deserializer::from_str(content) {
        if let Err(e) = serde_yaml::Value::deserialize(document) {
            let location = e
                .location()
                .map(|l| format!(" at line {}, column {}", l.line(), l.column()))
                .unwrap_or_default();
            return Err(format!("{}{}", e, location));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels_round_trip() {
        for label in Action::menu() {
            assert!(Action::from_label(&label).is_ok());
        }
        assert!(Action::from_label("Format the cluster").is_err());
    }

    #[test]
    fn test_skip_notice_names_the_release_namespace() {
        let tool = crate::infrastructure::tools::find_tool(CloudKind::Gcp, "prometheus").unwrap();
        assert!(skip_notice(tool, true).contains("already installed in the monitoring namespace"));
        assert!(skip_notice(tool, false).contains("not installed in the monitoring namespace"));
    }

    #[test]
    fn test_setup_checklist_names_cloud_prerequisites() {
        let aws = setup_checklist(CloudKind::Aws);
        assert!(aws.iter().any(|i| i.contains("Access Key ID")));
        assert!(aws.iter().any(|i| i.contains("kubeconfig")));

        let gcp = setup_checklist(CloudKind::Gcp);
        assert!(gcp.iter().any(|i| i.contains("service account")));
        assert!(gcp.iter().any(|i| i.contains("kubeconfig")));
    }

    #[test]
    fn test_check_yaml_accepts_multi_document_stream() {
        let content = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: demo\n---\nkind: Pod\n";
        assert!(check_yaml(content).is_ok());
    }

    #[test]
    fn test_check_yaml_reports_location() {
        let content = "key: value\n  bad indent: [\n";
        let err = check_yaml(content).unwrap_err();
        assert!(err.contains("line"));
    }

    #[test]
    fn test_check_yaml_rejects_empty_input() {
        assert!(check_yaml("  \n").is_err());
    }
}
