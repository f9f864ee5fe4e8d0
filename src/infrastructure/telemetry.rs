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

//! Best-effort usage events, appended as JSON lines to a local file.
//! Recording must never fail a wizard action; all errors are swallowed.

use chrono::Utc;
use serde_json::{json, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::constants::EVENTS_FILE_NAME;
use super::secrets::config_dir;

pub struct Telemetry {
    path: Option<PathBuf>,
}

impl Telemetry {
    pub fn open_default() -> Self {
        Self {
            path: config_dir().ok().map(|dir| dir.join(EVENTS_FILE_NAME)),
        }
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn record(&self, event: &str, fields: Value) {
        let Some(path) = &self.path else {
            return;
        };

        let line = json!({
            "event": event,
            "timestamp": Utc::now().to_rfc3339(),
            "fields": fields,
        });

        if let Err(e) = append_line(path, &line) {
            debug!(error = %e, "failed to record telemetry event");
        }
    }
}

fn append_line(path: &Path, line: &Value) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}
