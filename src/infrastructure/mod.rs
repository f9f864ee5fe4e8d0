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

//! External-facing plumbing: process execution, cloud CLIs, kubectl/helm
//! wrappers, manifest rendering, and local state files.

pub mod cloud;
pub mod constants;
pub mod exec;
pub mod helm;
pub mod kubeconfig;
pub mod kubectl;
pub mod manifest;
pub mod secrets;
pub mod telemetry;
pub mod tools;

pub use cloud::Provider;
pub use exec::{CommandOutput, CommandRunner, ShellRunner};
pub use secrets::SecretStore;
pub use telemetry::Telemetry;
