// CLI command definitions

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "k8s-manager",
    version,
    about = "Interactive wizard for managing Kubernetes clusters on AWS and GCP",
    long_about = "An interactive CLI that configures cloud credentials, saves and retrieves \
                  kubeconfigs, and deploys applications and cluster add-ons through kubectl and helm"
)]
pub struct CliArgs {
    /// Cloud provider to use (AWS or GCP); skips the provider menu
    #[arg(long)]
    pub cloud: Option<String>,

    /// Region to operate in; skips the region prompt
    #[arg(long)]
    pub region: Option<String>,

    /// Give up on a validated question after this many invalid answers
    /// instead of re-asking forever
    #[arg(long)]
    pub max_prompt_attempts: Option<u32>,
}
