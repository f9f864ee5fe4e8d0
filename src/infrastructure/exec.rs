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

//! External command execution. Every cluster mutation goes through an
//! external binary (kubectl, helm, aws, gcloud); this module is the only
//! place processes are spawned.

use crate::shared::error::{Result, WizardError};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a completed external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Seam over process execution so flows can be exercised against canned
/// outputs in tests.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, waiting for completion. A missing binary
    /// maps to `ToolNotFound`, a non-zero exit to `CommandFailed`.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Production runner backed by `tokio::process`.
pub struct ShellRunner;

#[async_trait::async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!(program, ?args, "running external command");

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => WizardError::ToolNotFound {
                    program: program.to_string(),
                },
                _ => WizardError::Io(e),
            })?;

        into_command_output(program, output)
    }
}

fn into_command_output(program: &str, output: Output) -> Result<CommandOutput> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(WizardError::CommandFailed {
            program: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput { stdout, stderr })
}
