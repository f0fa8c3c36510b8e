use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kube::core::DynamicObject;
use tokio::sync::RwLock;

use crate::client::{ClusterClient, ClusterInfo};
use crate::error::ClusterError;

type Key = (String, String, Option<String>, String); // (api_version, kind, namespace, name)

/// In-memory [`ClusterClient`] for tests — no network, no `kube::Client`.
/// Optionally primed to fail the next N applies with a transient error,
/// for exercising the Reconciler's backoff path.
#[derive(Clone, Default)]
pub struct FakeClusterClient {
    objects: Arc<RwLock<HashMap<Key, DynamicObject>>>,
    fail_next_applies: Arc<RwLock<usize>>,
    cluster_info: Arc<RwLock<ClusterInfo>>,
}

impl FakeClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` calls to `apply` return `ClusterError::Transient`
    /// instead of succeeding.
    pub async fn fail_next_applies(&self, count: usize) {
        *self.fail_next_applies.write().await = count;
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Primes the snapshot `cluster_info()` returns, for exercising the
    /// preflight runner without a real cluster.
    pub async fn set_cluster_info(&self, info: ClusterInfo) {
        *self.cluster_info.write().await = info;
    }
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn apply(&self, api_version: &str, kind: &str, namespace: Option<&str>, object: DynamicObject) -> Result<(), ClusterError> {
        {
            let mut remaining = self.fail_next_applies.write().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClusterError::Transient("fake transient failure".into()));
            }
        }
        let name = object
            .metadata
            .name
            .clone()
            .ok_or_else(|| ClusterError::Invalid("object is missing metadata.name".into()))?;
        let key = (api_version.to_string(), kind.to_string(), namespace.map(String::from), name);
        self.objects.write().await.insert(key, object);
        Ok(())
    }

    async fn get(&self, api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Result<Option<DynamicObject>, ClusterError> {
        let key = (api_version.to_string(), kind.to_string(), namespace.map(String::from), name.to_string());
        Ok(self.objects.read().await.get(&key).cloned())
    }

    async fn delete(&self, api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Result<(), ClusterError> {
        let key = (api_version.to_string(), kind.to_string(), namespace.map(String::from), name.to_string());
        self.objects.write().await.remove(&key);
        Ok(())
    }

    async fn list(&self, api_version: &str, kind: &str, namespace: Option<&str>) -> Result<Vec<DynamicObject>, ClusterError> {
        let guard = self.objects.read().await;
        Ok(guard
            .iter()
            .filter(|((av, k, ns, _), _)| av == api_version && k == kind && ns.as_deref() == namespace)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn cluster_info(&self) -> Result<ClusterInfo, ClusterError> {
        Ok(self.cluster_info.read().await.clone())
    }
}
