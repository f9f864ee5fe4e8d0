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

//! Core records gathered by the wizard and the field validation rules the
//! prompt engine applies to raw answers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Cloud discriminator. A closed set; adding a provider is a new arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudKind {
    Aws,
    Gcp,
}

impl CloudKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudKind::Aws => "AWS",
            CloudKind::Gcp => "GCP",
        }
    }
}

impl fmt::Display for CloudKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloud and cluster facts established once per run, after authentication
/// and cluster selection. Immutable; passed by reference into every action.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub cloud: CloudKind,
    pub region: String,
    /// Secret-store key the kubeconfig was loaded from.
    pub credentials_ref: String,
    pub kubeconfig_path: PathBuf,
    pub cluster_name: String,
}

/// Finalized deployment settings for one application.
///
/// Invariant: `host` is `Some` iff `is_public` is true; the host never
/// carries a URL scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploySettings {
    pub namespace: String,
    pub app_name: String,
    pub image: String,
    pub target_port: u16,
    pub port: u16,
    pub replicas: i32,
    pub is_public: bool,
    pub host: Option<String>,
}

/// Autoscaling settings; only present when the operator configured HPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpaSettings {
    pub min_pods: i32,
    pub max_pods: i32,
    pub target_cpu_percent: i32,
}

/// Prior cluster-side configuration discovered for an application before
/// prompting. Gathered fresh per deploy action, never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorConfig {
    pub target_port: u16,
    pub port: u16,
    pub replicas: i32,
    pub is_public: bool,
    pub host: Option<String>,
    pub hpa: Option<HpaSettings>,
}

/// Strip a leading `scheme://` from a host answer. Some input channels
/// auto-link bare hostnames, so `http://api.example.com` and
/// `api.example.com` must normalize identically.
pub fn normalize_host(input: &str) -> String {
    match input.split_once("://") {
        Some((_, rest)) => rest.to_string(),
        None => input.to_string(),
    }
}

/// Strip every literal `http://` from an image reference (same auto-link
/// artifact, but it can appear mid-string in a registry path).
pub fn normalize_image(input: &str) -> String {
    input.replace("http://", "")
}

pub fn is_valid_app_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn is_valid_image(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_valid_port(value: &str) -> bool {
    matches!(value.trim().parse::<u16>(), Ok(p) if p > 0)
}

pub fn is_valid_replicas(value: &str) -> bool {
    matches!(value.trim().parse::<i32>(), Ok(r) if r > 0)
}

pub fn is_valid_min_pods(value: &str) -> bool {
    matches!(value.trim().parse::<i32>(), Ok(n) if n >= 1)
}

pub fn is_valid_max_pods(value: &str, min_pods: i32) -> bool {
    matches!(value.trim().parse::<i32>(), Ok(n) if n > min_pods)
}

/// Target CPU utilization must lie strictly between 0 and 100.
pub fn is_valid_target_cpu(value: &str) -> bool {
    matches!(value.trim().parse::<i32>(), Ok(n) if n > 0 && n < 100)
}
