use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use controller_domain::ManifestKey;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct IndexInner {
    by_kind: HashMap<String, HashSet<ManifestKey>>,
    by_namespace: HashMap<String, HashSet<ManifestKey>>,
    by_name: HashMap<String, HashSet<ManifestKey>>,
}

/// In-memory secondary index of Manifest keys by `kind`, `namespace`, and
/// `name`, for O(1) filtering. Not authoritative — I3: the Manifest Store
/// is the single writer of index entries, and the index must be
/// rebuildable from a full scan of the store at any time.
#[derive(Debug, Clone, Default)]
pub struct Index {
    inner: Arc<RwLock<IndexInner>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, key: &ManifestKey) {
        let mut guard = self.inner.write().await;
        guard
            .by_kind
            .entry(key.kind().to_string())
            .or_default()
            .insert(key.clone());
        guard
            .by_namespace
            .entry(key.namespace().to_string())
            .or_default()
            .insert(key.clone());
        guard
            .by_name
            .entry(key.name().to_string())
            .or_default()
            .insert(key.clone());
    }

    pub async fn remove(&self, key: &ManifestKey) {
        let mut guard = self.inner.write().await;
        if let Some(set) = guard.by_kind.get_mut(key.kind()) {
            set.remove(key);
        }
        if let Some(set) = guard.by_namespace.get_mut(key.namespace()) {
            set.remove(key);
        }
        if let Some(set) = guard.by_name.get_mut(key.name()) {
            set.remove(key);
        }
    }

    pub async fn by_kind(&self, kind: &str) -> Vec<ManifestKey> {
        let guard = self.inner.read().await;
        guard
            .by_kind
            .get(kind)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn by_namespace(&self, namespace: &str) -> Vec<ManifestKey> {
        let guard = self.inner.read().await;
        guard
            .by_namespace
            .get(namespace)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn by_name(&self, name: &str) -> Vec<ManifestKey> {
        let guard = self.inner.read().await;
        guard
            .by_name
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.by_kind.values().map(|s| s.len()).sum()
    }

    /// Discards all entries and re-adds one per key in `keys` — used by
    /// the Manifest Store to rebuild the index from a full scan.
    pub async fn rebuild(&self, keys: impl Iterator<Item = ManifestKey>) {
        let mut guard = self.inner.write().await;
        guard.by_kind.clear();
        guard.by_namespace.clear();
        guard.by_name.clear();
        drop(guard);
        for key in keys {
            self.add(&key).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_then_query_by_kind_and_namespace() {
        let index = Index::new();
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        index.add(&key).await;
        assert_eq!(index.by_kind("Service").await, vec![key.clone()]);
        assert_eq!(index.by_namespace("default").await, vec![key.clone()]);
        assert_eq!(index.by_name("svc").await, vec![key]);
    }

    #[tokio::test]
    async fn remove_clears_all_three_dimensions() {
        let index = Index::new();
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        index.add(&key).await;
        index.remove(&key).await;
        assert!(index.by_kind("Service").await.is_empty());
        assert!(index.by_namespace("default").await.is_empty());
        assert!(index.by_name("svc").await.is_empty());
    }

    #[tokio::test]
    async fn rebuild_replaces_existing_entries() {
        let index = Index::new();
        let stale = ManifestKey::parse("default/Service/stale").unwrap();
        index.add(&stale).await;

        let fresh = ManifestKey::parse("default/Service/fresh").unwrap();
        index.rebuild(std::iter::once(fresh.clone())).await;

        assert_eq!(index.by_kind("Service").await, vec![fresh]);
    }
}
