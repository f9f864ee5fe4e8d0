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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, WizardError>;

#[derive(Error, Debug)]
pub enum WizardError {
    /// The external binary (kubectl, helm, aws, gcloud) is not on PATH.
    #[error("external tool '{program}' not found; please make sure it is installed and on PATH")]
    ToolNotFound { program: String },

    /// The external command ran but exited non-zero.
    #[error("command '{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    /// The external command succeeded but its output could not be parsed.
    #[error("unexpected output from '{program}': {reason}")]
    MalformedOutput { program: String, reason: String },

    /// Malformed or missing cloud credential. Fatal; the session terminates.
    #[error("credential error: {0}")]
    Credential(String),

    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// The operator cancelled an interactive prompt (Ctrl-C / Esc).
    #[error("operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl WizardError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn malformed_output(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedOutput {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Credential errors terminate the session; everything else is reported
    /// and the wizard returns to the main menu.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Credential(_))
    }
}
