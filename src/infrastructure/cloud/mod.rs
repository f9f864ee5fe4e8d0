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

//! Cloud provider surface: authenticate, pick a region, and report the
//! environment variables a shell needs to reach the cluster. The variant
//! set is closed; every call site matches exhaustively.

pub mod aws;
pub mod gcp;

use crate::cli::prompt::Prompter;
use crate::domain::settings::CloudKind;
use crate::shared::error::{Result, WizardError};

use super::exec::CommandRunner;
use super::secrets::SecretStore;
use super::telemetry::Telemetry;

pub use aws::AwsProvider;
pub use gcp::GcpProvider;

/// Shared dependencies for provider authentication.
pub struct AuthContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub secrets: &'a mut SecretStore,
    pub telemetry: &'a Telemetry,
}

#[derive(Debug)]
pub enum Provider {
    Aws(AwsProvider),
    Gcp(GcpProvider),
}

impl Provider {
    pub fn for_cloud(kind: CloudKind) -> Self {
        match kind {
            CloudKind::Aws => Provider::Aws(AwsProvider::new()),
            CloudKind::Gcp => Provider::Gcp(GcpProvider::new()),
        }
    }

    /// Resolve a provider from the menu discriminator. An unknown name
    /// is a configuration error, not a prompt retry.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_uppercase().as_str() {
            "AWS" => Ok(Self::for_cloud(CloudKind::Aws)),
            "GCP" => Ok(Self::for_cloud(CloudKind::Gcp)),
            other => Err(WizardError::config_error(format!(
                "unknown cloud provider: {}",
                other
            ))),
        }
    }

    pub fn kind(&self) -> CloudKind {
        match self {
            Provider::Aws(_) => CloudKind::Aws,
            Provider::Gcp(_) => CloudKind::Gcp,
        }
    }

    pub fn regions(&self) -> &'static [&'static str] {
        match self {
            Provider::Aws(p) => p.regions(),
            Provider::Gcp(p) => p.regions(),
        }
    }

    /// Environment variables the operator should export to use the
    /// authenticated session from their own shell.
    pub fn env_vars(&self) -> String {
        match self {
            Provider::Aws(p) => p.env_vars(),
            Provider::Gcp(p) => p.env_vars(),
        }
    }

    pub async fn authenticate(
        &mut self,
        prompter: &mut dyn Prompter,
        ctx: &mut AuthContext<'_>,
    ) -> Result<()> {
        match self {
            Provider::Aws(p) => p.authenticate(prompter, ctx).await,
            Provider::Gcp(p) => p.authenticate(prompter, ctx).await,
        }
    }

    /// The region for this session. AWS resolves it during
    /// authentication; GCP asks on first use.
    pub fn region(&mut self, prompter: &mut dyn Prompter) -> Result<String> {
        match self {
            Provider::Aws(p) => p.region(),
            Provider::Gcp(p) => p.region(prompter),
        }
    }

    /// Preset the region, suppressing the interactive pick.
    pub fn set_region(&mut self, region: String) {
        match self {
            Provider::Aws(p) => p.set_region(region),
            Provider::Gcp(p) => p.set_region(region),
        }
    }
}
