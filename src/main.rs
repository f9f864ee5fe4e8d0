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

use clap::Parser;
use k8s_manager::{
    CliArgs, SecretStore, ShellRunner, Telemetry, TermPrompter, Wizard, WizardError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();

    let mut prompter = TermPrompter;
    let runner = ShellRunner;
    let secrets = SecretStore::open_default()?;
    let telemetry = Telemetry::open_default();

    let mut wizard = Wizard::new(&mut prompter, &runner, secrets, telemetry)
        .with_max_attempts(args.max_prompt_attempts)
        .with_preset_cloud(args.cloud)
        .with_preset_region(args.region);

    match wizard.run().await {
        Ok(()) => Ok(()),
        Err(WizardError::Cancelled) => {
            eprintln!("Cancelled.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
