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

use k8s_manager::cli::prompt::scripted::{Answer, ScriptedPrompter};
use k8s_manager::domain::ConfigResolver;
use k8s_manager::infrastructure::manifest::render_bundle;
use k8s_manager::*;

fn settings(is_public: bool) -> DeploySettings {
    DeploySettings {
        namespace: "prod".to_string(),
        app_name: "api".to_string(),
        image: "registry/api:1".to_string(),
        target_port: 8080,
        port: 80,
        replicas: 2,
        is_public,
        host: is_public.then(|| "api.example.com".to_string()),
    }
}

#[test]
fn test_full_deploy_bundle_round_trip() {
    let hpa = HpaSettings {
        min_pods: 1,
        max_pods: 4,
        target_cpu_percent: 60,
    };
    let bundle = render_bundle(&settings(true), Some(&hpa)).unwrap();

    let docs: Vec<serde_yaml::Value> = bundle
        .split("---\n")
        .map(|doc| serde_yaml::from_str(doc).unwrap())
        .collect();

    let kinds: Vec<&str> = docs.iter().map(|d| d["kind"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec!["Deployment", "Service", "Ingress", "HorizontalPodAutoscaler"]
    );

    // Every document must land in the selected namespace and be
    // applicable standalone (apiVersion present).
    for doc in &docs {
        assert_eq!(doc["metadata"]["namespace"].as_str(), Some("prod"));
        assert!(doc["apiVersion"].as_str().is_some());
    }

    // The autoscaler targets the deployment built in the same bundle.
    assert_eq!(
        docs[3]["spec"]["scaleTargetRef"]["name"].as_str(),
        docs[0]["metadata"]["name"].as_str()
    );
}

#[test]
fn test_private_app_never_renders_an_ingress() {
    let bundle = render_bundle(&settings(false), None).unwrap();
    assert!(!bundle.contains("kind: Ingress"));
}

#[test]
fn test_resolver_reuse_path_skips_value_prompts() {
    let prior = PriorConfig {
        target_port: 8080,
        port: 80,
        replicas: 3,
        is_public: true,
        host: Some("api.example.com".to_string()),
        hpa: None,
    };

    let mut prompter = ScriptedPrompter::new(vec![Answer::Confirm(true)]);
    let resolved = ConfigResolver::new(&mut prompter, None)
        .resolve_deploy("api", Some(&prior))
        .unwrap();

    assert_eq!(resolved, prior);
    assert_eq!(prompter.asked.len(), 1);
}

#[test]
fn test_resolver_end_to_end_collects_and_normalizes() {
    let mut prompter = ScriptedPrompter::new(vec![
        // Deploy values, with one invalid port answer along the way.
        Answer::Text("not-a-port".into()),
        Answer::Text("8080".into()),
        Answer::Text("80".into()),
        Answer::Text("2".into()),
        Answer::Confirm(true),
        Answer::Text("https://shop.example.com".into()),
        // HPA values.
        Answer::Text("1".into()),
        Answer::Text("4".into()),
        Answer::Text("75".into()),
    ]);

    let mut resolver = ConfigResolver::new(&mut prompter, None);
    let config = resolver.resolve_deploy("shop", None).unwrap();
    let hpa = resolver.resolve_hpa("shop", None).unwrap();

    assert_eq!(config.target_port, 8080);
    assert_eq!(config.host.as_deref(), Some("shop.example.com"));
    assert_eq!(hpa.max_pods, 4);

    let settings = DeploySettings {
        namespace: "default".to_string(),
        app_name: "shop".to_string(),
        image: "registry/shop:2".to_string(),
        target_port: config.target_port,
        port: config.port,
        replicas: config.replicas,
        is_public: config.is_public,
        host: config.host,
    };
    let bundle = render_bundle(&settings, Some(&hpa)).unwrap();
    assert!(bundle.contains("host: shop.example.com"));
    assert!(bundle.contains("targetCPUUtilizationPercentage: 75"));
}

#[test]
fn test_validation_rules_match_documented_behavior() {
    use k8s_manager::domain::settings::*;

    // Replicas: strictly positive integers.
    assert!(is_valid_replicas("1") && !is_valid_replicas("0") && !is_valid_replicas("x"));
    // Pods pairing: (1,1) rejected, (1,2) accepted.
    assert!(!is_valid_max_pods("1", 1) && is_valid_max_pods("2", 1));
    // Target CPU: open interval (0, 100).
    assert!(!is_valid_target_cpu("0") && is_valid_target_cpu("99") && !is_valid_target_cpu("100"));
    // Host normalization strips any scheme.
    assert_eq!(normalize_host("http://api.example.com"), "api.example.com");
    assert_eq!(normalize_host("api.example.com"), "api.example.com");
}
