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

//! Keyed secret store backed by a JSON file in the user config directory.
//! Kubeconfigs are stored under `KUBECONFIG_<CLUSTERNAME>_<CLOUD>` so
//! multiple clusters across clouds never collide.

use crate::shared::error::{Result, WizardError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::SECRETS_FILE_NAME;

pub struct SecretStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl SecretStore {
    /// Open the store in the application config directory, creating it
    /// on first use.
    pub fn open_default() -> Result<Self> {
        let dir = config_dir()?;
        Self::open(dir.join(SECRETS_FILE_NAME))
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    /// Kubeconfig keys already stored for a cloud, for the "retrieve a
    /// saved kubeconfig" path.
    pub fn kubeconfig_keys(&self, cloud: &str) -> Vec<&str> {
        let suffix = format!("_{}", cloud.to_uppercase());
        self.entries
            .keys()
            .filter(|k| k.starts_with("KUBECONFIG_") && k.ends_with(&suffix))
            .map(String::as_str)
            .collect()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, body)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

/// `KUBECONFIG_<CLUSTERNAME_UPPERCASE>_<CLOUD>` with non-alphanumerics
/// folded to underscores.
pub fn kubeconfig_key(cluster_name: &str, cloud: &str) -> String {
    let cluster: String = cluster_name
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("KUBECONFIG_{}_{}", cluster, cloud.to_uppercase())
}

pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| WizardError::config_error("could not resolve the user config directory"))?;
    Ok(base.join("k8s-manager"))
}

#[cfg(unix)]
pub(crate) fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
