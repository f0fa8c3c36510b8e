use controller_cluster::{ClusterClient, ClusterInfo};
use controller_config::{load_bundled_preflight_checks, PreflightCheckDef};
use serde::Serialize;

use crate::error::ReconcileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overall {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementResult {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    pub requirements: Vec<RequirementResult>,
    pub overall: Overall,
}

fn check_one(def: &PreflightCheckDef, info: &ClusterInfo) -> RequirementResult {
    let (passed, detail) = match def.kind.as_str() {
        "kubernetes-version" => {
            let minimum = def.check_config.minimum_version.as_deref().unwrap_or("0.0.0");
            let passed = compare_versions(&info.server_version, minimum) >= 0;
            (passed, format!("cluster reports {}, requires >= {minimum}", info.server_version))
        }
        "node-count" => {
            let minimum = def.check_config.minimum.unwrap_or(0.0);
            let passed = info.node_count as f64 >= minimum;
            (passed, format!("{} node(s), requires >= {minimum}", info.node_count))
        }
        "storage-class" => {
            let name = def.check_config.name.as_deref().unwrap_or_default();
            let passed = info.storage_classes.iter().any(|s| s == name);
            (passed, format!("storage classes [{}], requires `{name}`", info.storage_classes.join(", ")))
        }
        "cpu" => {
            let minimum = def.check_config.minimum.unwrap_or(0.0);
            let passed = info.allocatable_cpu_cores >= minimum;
            (passed, format!("{:.1} allocatable core(s), requires >= {minimum}", info.allocatable_cpu_cores))
        }
        "memory" => {
            let minimum = def.check_config.minimum.unwrap_or(0.0);
            let passed = info.allocatable_memory_gib >= minimum;
            (passed, format!("{:.1} GiB allocatable, requires >= {minimum} GiB", info.allocatable_memory_gib))
        }
        other => (false, format!("unrecognized check kind `{other}`")),
    };

    RequirementResult {
        name: def.name.clone(),
        description: def.description.clone(),
        required: def.required,
        passed,
        detail,
    }
}

/// Dotted-version comparison good enough for `"1.24.0"`-shaped strings;
/// any non-numeric segment from a free-form `kubelet_version` (e.g. a
/// `-eks` suffix) is ignored rather than failing the comparison.
fn compare_versions(actual: &str, minimum: &str) -> i32 {
    let parse = |s: &str| -> Vec<u64> {
        s.trim_start_matches('v')
            .split(|c| c == '.' || c == '-' || c == '+')
            .map(|p| p.parse::<u64>().unwrap_or(0))
            .collect()
    };
    let a = parse(actual);
    let b = parse(minimum);
    for i in 0..a.len().max(b.len()) {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        if av != bv {
            return if av > bv { 1 } else { -1 };
        }
    }
    0
}

/// Runs the bundled cluster-preflight-check suite against a live
/// [`ClusterClient`] and folds the overall result per §6: `fail` wins
/// over `warning` wins over `pass`, but only `required` failures promote
/// to `fail`.
pub async fn run_preflight(client: &dyn ClusterClient) -> Result<PreflightReport, ReconcileError> {
    let checks = load_bundled_preflight_checks()?;
    let info = client.cluster_info().await?;

    let requirements: Vec<RequirementResult> = checks.checks.iter().map(|def| check_one(def, &info)).collect();

    let overall = if requirements.iter().any(|r| r.required && !r.passed) {
        Overall::Fail
    } else if requirements.iter().any(|r| !r.passed) {
        Overall::Warning
    } else {
        Overall::Pass
    };

    Ok(PreflightReport { requirements, overall })
}

#[cfg(test)]
mod tests {
    use super::*;
    use controller_cluster::FakeClusterClient;

    #[tokio::test]
    async fn healthy_cluster_passes() {
        let client = FakeClusterClient::new();
        client
            .set_cluster_info(ClusterInfo {
                server_version: "1.28.2".into(),
                node_count: 3,
                allocatable_cpu_cores: 8.0,
                allocatable_memory_gib: 16.0,
                storage_classes: vec!["standard".into()],
            })
            .await;
        let report = run_preflight(&client).await.unwrap();
        assert_eq!(report.overall, Overall::Pass);
    }

    #[tokio::test]
    async fn missing_required_check_fails_overall() {
        let client = FakeClusterClient::new();
        client
            .set_cluster_info(ClusterInfo {
                server_version: "1.10.0".into(),
                node_count: 1,
                allocatable_cpu_cores: 8.0,
                allocatable_memory_gib: 16.0,
                storage_classes: vec!["standard".into()],
            })
            .await;
        let report = run_preflight(&client).await.unwrap();
        assert_eq!(report.overall, Overall::Fail);
    }

    #[tokio::test]
    async fn only_optional_check_failing_is_a_warning() {
        let client = FakeClusterClient::new();
        client
            .set_cluster_info(ClusterInfo {
                server_version: "1.28.2".into(),
                node_count: 3,
                allocatable_cpu_cores: 1.0,
                allocatable_memory_gib: 1.0,
                storage_classes: vec!["standard".into()],
            })
            .await;
        let report = run_preflight(&client).await.unwrap();
        assert_eq!(report.overall, Overall::Warning);
    }
}
