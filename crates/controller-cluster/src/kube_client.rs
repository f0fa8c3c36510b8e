use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::api::storage::v1::StorageClass;
use kube::api::{ListParams, Patch, PatchParams};
use kube::config::KubeConfigOptions;
use kube::core::DynamicObject;
use kube::{Api, Client, Config};
use tracing::debug;

use crate::client::{ClusterClient, ClusterInfo};
use crate::error::ClusterError;
use crate::gvk::api_resource_for;

const FIELD_MANAGER: &str = "controller";

/// `kube`-backed [`ClusterClient`]. In-cluster config is tried first,
/// falling back to the local kubeconfig — the same order
/// `newrelic-agent-control`'s `AsyncK8sClient::try_new` uses.
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub async fn try_new() -> Result<Self, ClusterError> {
        let config = match Config::incluster() {
            Ok(c) => c,
            Err(e) => {
                debug!("in-cluster config unavailable ({e}), falling back to kubeconfig");
                Config::from_kubeconfig(&KubeConfigOptions::default())
                    .await
                    .map_err(|e| ClusterError::ClientSetup(e.to_string()))?
            }
        };
        let client = Client::try_from(config).map_err(|e| ClusterError::ClientSetup(e.to_string()))?;
        Ok(KubeClusterClient { client })
    }

    fn api(&self, api_version: &str, kind: &str, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = api_resource_for(api_version, kind);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn apply(&self, api_version: &str, kind: &str, namespace: Option<&str>, object: DynamicObject) -> Result<(), ClusterError> {
        let name = object
            .metadata
            .name
            .clone()
            .ok_or_else(|| ClusterError::Invalid("object is missing metadata.name".into()))?;
        let api = self.api(api_version, kind, namespace);
        let params = PatchParams::apply(FIELD_MANAGER).force();
        api.patch(&name, &params, &Patch::Apply(&object))
            .await
            .map_err(ClusterError::from_kube)?;
        Ok(())
    }

    async fn get(&self, api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Result<Option<DynamicObject>, ClusterError> {
        let api = self.api(api_version, kind, namespace);
        api.get_opt(name).await.map_err(ClusterError::from_kube)
    }

    async fn delete(&self, api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Result<(), ClusterError> {
        let api = self.api(api_version, kind, namespace);
        match api.delete(name, &Default::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(()),
            Err(e) => Err(ClusterError::from_kube(e)),
        }
    }

    async fn list(&self, api_version: &str, kind: &str, namespace: Option<&str>) -> Result<Vec<DynamicObject>, ClusterError> {
        let api = self.api(api_version, kind, namespace);
        let list = api.list(&Default::default()).await.map_err(ClusterError::from_kube)?;
        Ok(list.items)
    }

    async fn cluster_info(&self) -> Result<ClusterInfo, ClusterError> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let node_list = nodes.list(&ListParams::default()).await.map_err(ClusterError::from_kube)?;

        let mut allocatable_cpu_cores = 0.0;
        let mut allocatable_memory_gib = 0.0;
        let mut server_version = String::new();
        for node in &node_list.items {
            if let Some(status) = &node.status {
                if server_version.is_empty() {
                    if let Some(info) = &status.node_info {
                        server_version = info.kubelet_version.clone();
                    }
                }
                if let Some(allocatable) = &status.allocatable {
                    if let Some(cpu) = allocatable.get("cpu") {
                        allocatable_cpu_cores += parse_cpu_quantity(&cpu.0);
                    }
                    if let Some(mem) = allocatable.get("memory") {
                        allocatable_memory_gib += parse_memory_quantity_gib(&mem.0);
                    }
                }
            }
        }

        let storage_classes: Api<StorageClass> = Api::all(self.client.clone());
        let sc_list = storage_classes.list(&ListParams::default()).await.map_err(ClusterError::from_kube)?;
        let storage_classes = sc_list
            .items
            .into_iter()
            .filter_map(|sc| sc.metadata.name)
            .collect();

        Ok(ClusterInfo {
            server_version,
            node_count: node_list.items.len(),
            allocatable_cpu_cores,
            allocatable_memory_gib,
            storage_classes,
        })
    }
}

/// Parses a Kubernetes CPU resource quantity (`"4"`, `"4000m"`) into
/// whole cores. Unrecognized suffixes fall back to `0.0` rather than
/// failing the whole preflight run over one malformed node.
fn parse_cpu_quantity(raw: &str) -> f64 {
    if let Some(milli) = raw.strip_suffix('m') {
        milli.parse::<f64>().map(|m| m / 1000.0).unwrap_or(0.0)
    } else {
        raw.parse::<f64>().unwrap_or(0.0)
    }
}

/// Parses a Kubernetes memory resource quantity (`"16Gi"`, `"16384Mi"`,
/// `"16000000000"`) into GiB.
fn parse_memory_quantity_gib(raw: &str) -> f64 {
    const UNITS: &[(&str, f64)] = &[
        ("Ei", 1024f64.powi(6) / 1024f64.powi(3)),
        ("Pi", 1024f64.powi(5) / 1024f64.powi(3)),
        ("Ti", 1024f64.powi(4) / 1024f64.powi(3)),
        ("Gi", 1.0),
        ("Mi", 1.0 / 1024.0),
        ("Ki", 1.0 / 1024f64.powi(2)),
    ];
    for (suffix, gib_per_unit) in UNITS {
        if let Some(value) = raw.strip_suffix(suffix) {
            return value.parse::<f64>().map(|v| v * gib_per_unit).unwrap_or(0.0);
        }
    }
    raw.parse::<f64>().map(|bytes| bytes / 1024f64.powi(3)).unwrap_or(0.0)
}
