//! Table rendering for the resource list action

use super::{icons::parse_readiness, ColorTheme, StatusIcon};
use crate::infrastructure::kubectl::{DeploymentInfo, PodInfo};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the pod list as a formatted table
    pub fn render_pods(&self, pods: &[PodInfo]) -> String {
        if pods.is_empty() {
            return "No pods found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("NAMESPACE").set_alignment(CellAlignment::Left),
                Cell::new("READY").set_alignment(CellAlignment::Center),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
                Cell::new("AGE").set_alignment(CellAlignment::Right),
                Cell::new("NODE").set_alignment(CellAlignment::Left),
                Cell::new("IP").set_alignment(CellAlignment::Left),
                Cell::new("CONTAINERS").set_alignment(CellAlignment::Left),
            ]);

        for pod in pods {
            let (ready, total) = parse_readiness(&pod.ready);
            let ready_icon = StatusIcon::get_readiness_icon(ready, total);
            let ready_color = self.theme.get_readiness_color(ready, total);
            let status_color = self.theme.get_phase_color(&pod.status);

            table.add_row(vec![
                Cell::new(&pod.name),
                Cell::new(&pod.namespace),
                Cell::new(format!("{} {}", ready_icon, pod.ready)).fg(ready_color),
                Cell::new(&pod.status).fg(status_color),
                Cell::new(&pod.age),
                Cell::new(pod.node.as_deref().unwrap_or("-")),
                Cell::new(pod.pod_ip.as_deref().unwrap_or("-")),
                Cell::new(format_containers(&pod.containers)),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Pods {} ─╮\n",
            format!("[{} pods]", pods.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    /// Render the deployment list as a formatted table
    pub fn render_deployments(&self, deployments: &[DeploymentInfo]) -> String {
        if deployments.is_empty() {
            return "No deployments found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("NAMESPACE").set_alignment(CellAlignment::Left),
                Cell::new("READY").set_alignment(CellAlignment::Center),
                Cell::new("AGE").set_alignment(CellAlignment::Right),
                Cell::new("SELECTOR").set_alignment(CellAlignment::Left),
                Cell::new("CONTAINERS").set_alignment(CellAlignment::Left),
            ]);

        for deployment in deployments {
            let (ready, total) = parse_readiness(&deployment.ready);
            let ready_icon = StatusIcon::get_readiness_icon(ready, total);
            let ready_color = self.theme.get_readiness_color(ready, total);

            table.add_row(vec![
                Cell::new(&deployment.name),
                Cell::new(&deployment.namespace),
                Cell::new(format!("{} {}", ready_icon, deployment.ready)).fg(ready_color),
                Cell::new(&deployment.age),
                Cell::new(deployment.selector.join(",")),
                Cell::new(format_containers(&deployment.containers)),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Deployments {} ─╮\n",
            format!("[{} deployments]", deployments.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }
}

fn format_containers(containers: &std::collections::BTreeMap<String, String>) -> String {
    containers
        .iter()
        .map(|(name, image)| format!("{}: {}", name, image))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn pod() -> PodInfo {
        let mut containers = BTreeMap::new();
        containers.insert("api".to_string(), "registry/api:1".to_string());
        PodInfo {
            name: "api-5d9".to_string(),
            namespace: "prod".to_string(),
            status: "Running".to_string(),
            age: "3d7h".to_string(),
            containers,
            node: Some("node-a".to_string()),
            pod_ip: Some("10.0.0.4".to_string()),
            ready: "1/1".to_string(),
        }
    }

    #[test]
    fn test_render_empty_pods() {
        let renderer = TableRenderer::new();
        assert!(renderer.render_pods(&[]).contains("No pods found"));
    }

    #[test]
    fn test_render_pod_row() {
        let renderer = TableRenderer::new();
        let output = renderer.render_pods(&[pod()]);
        assert!(output.contains("api-5d9"));
        assert!(output.contains("prod"));
        assert!(output.contains("1/1"));
        assert!(output.contains("registry/api:1"));
    }

    #[test]
    fn test_render_deployment_row() {
        let mut containers = BTreeMap::new();
        containers.insert("api".to_string(), "registry/api:2".to_string());
        let deployment = DeploymentInfo {
            name: "api".to_string(),
            namespace: "prod".to_string(),
            age: "10d".to_string(),
            containers,
            selector: vec!["app=api".to_string()],
            ready: "2/3".to_string(),
        };

        let renderer = TableRenderer::new();
        let output = renderer.render_deployments(&[deployment]);
        assert!(output.contains("app=api"));
        assert!(output.contains("2/3"));
    }
}
