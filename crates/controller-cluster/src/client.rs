use async_trait::async_trait;
use kube::core::DynamicObject;

use crate::error::ClusterError;

/// Cluster capability snapshot used by the reconciler's preflight checks
/// (§6 "Cluster preflight check configuration"): one round-trip's worth
/// of facts, not a live probe per check.
#[derive(Debug, Clone, Default)]
pub struct ClusterInfo {
    pub server_version: String,
    pub node_count: usize,
    pub allocatable_cpu_cores: f64,
    pub allocatable_memory_gib: f64,
    pub storage_classes: Vec<String>,
}

/// Narrow interface onto the target orchestrator (a Kubernetes-style
/// API). The Reconciler is the only caller; it never talks to `kube`
/// directly. `apiVersion`/`kind` identify the resource type, `namespace`
/// is `None` for cluster-scoped kinds (e.g. `Namespace` itself).
#[async_trait]
pub trait ClusterClient: Send + Sync + 'static {
    /// Create-or-update via server-side apply.
    async fn apply(&self, api_version: &str, kind: &str, namespace: Option<&str>, object: DynamicObject) -> Result<(), ClusterError>;

    async fn get(&self, api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Result<Option<DynamicObject>, ClusterError>;

    /// Absent resources are not an error (§4.5 `DeleteManifests`).
    async fn delete(&self, api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Result<(), ClusterError>;

    async fn list(&self, api_version: &str, kind: &str, namespace: Option<&str>) -> Result<Vec<DynamicObject>, ClusterError>;

    /// Snapshot used by the cluster preflight runner.
    async fn cluster_info(&self) -> Result<ClusterInfo, ClusterError>;
}
