use std::sync::Arc;

use controller_domain::{validate_manifest_bytes, ManifestKey, ManifestRecord};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::StoreError;
use crate::index::Index;
use crate::kv::{KvBackend, Table};

const NOTIFY_CHANNEL_CAPACITY: usize = 100;

/// Versioned key→YAML-bytes map, built atop a [`KvBackend`] and secondary
/// [`Index`]. `Create`/`Update`/`Delete` perform a non-blocking enqueue of
/// the affected key onto a bounded reconcile-notification channel;
/// enqueue drops silently when the channel is full (the reconciler's
/// periodic resync is the correctness backstop, per §4.1/§5 — a missed
/// notification is never a correctness bug, only a latency one).
#[derive(Clone)]
pub struct ManifestStore {
    backend: Arc<dyn KvBackend>,
    index: Index,
    notify: mpsc::Sender<ManifestKey>,
}

impl ManifestStore {
    /// Opens the store atop `backend`, rebuilding the index from a full
    /// scan (so a `RedbBackend` reopened across a restart comes back with
    /// a correct index without replaying any log).
    pub async fn open(backend: Arc<dyn KvBackend>) -> Result<(Self, mpsc::Receiver<ManifestKey>), StoreError> {
        let (tx, rx) = mpsc::channel(NOTIFY_CHANNEL_CAPACITY);
        let index = Index::new();

        let entries = backend.scan(Table::Manifests).await?;
        let keys = entries
            .iter()
            .filter_map(|(k, _)| std::str::from_utf8(k).ok())
            .filter_map(|k| ManifestKey::parse(k).ok());
        index.rebuild(keys).await;

        Ok((
            ManifestStore {
                backend,
                index,
                notify: tx,
            },
            rx,
        ))
    }

    fn notify_key(&self, key: &ManifestKey) {
        if self.notify.try_send(key.clone()).is_err() {
            debug!("reconcile notification channel full or closed, dropping notify for {key}");
        }
    }

    /// Snapshot: every record, lexicographically ordered by key.
    pub async fn list(&self) -> Result<Vec<ManifestRecord>, StoreError> {
        let entries = self.backend.scan(Table::Manifests).await?;
        entries
            .into_iter()
            .map(|(_, v)| serde_json::from_slice(&v).map_err(StoreError::from))
            .collect()
    }

    pub async fn get(&self, key: &ManifestKey) -> Result<Option<ManifestRecord>, StoreError> {
        match self.backend.get(Table::Manifests, key.as_str().as_bytes()).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, key: ManifestKey, yaml_bytes: String) -> Result<ManifestRecord, StoreError> {
        if self.get(&key).await?.is_some() {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        validate_manifest_bytes(&yaml_bytes)?;

        let record = ManifestRecord::new(key.clone(), yaml_bytes);
        let bytes = serde_json::to_vec(&record)?;
        self.backend.put(Table::Manifests, key.as_str().as_bytes(), &bytes).await?;
        self.index.add(&key).await;
        self.notify_key(&key);
        Ok(record)
    }

    pub async fn update(&self, key: &ManifestKey, yaml_bytes: String) -> Result<ManifestRecord, StoreError> {
        let mut record = self
            .get(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        validate_manifest_bytes(&yaml_bytes)?;

        record.bump(yaml_bytes);
        let bytes = serde_json::to_vec(&record)?;
        self.backend.put(Table::Manifests, key.as_str().as_bytes(), &bytes).await?;
        self.notify_key(key);
        Ok(record)
    }

    pub async fn delete(&self, key: &ManifestKey) -> Result<(), StoreError> {
        let existed = self.backend.delete(Table::Manifests, key.as_str().as_bytes()).await?;
        if !existed {
            return Err(StoreError::NotFound(key.to_string()));
        }
        self.index.remove(key).await;
        self.notify_key(key);
        Ok(())
    }

    pub fn index(&self) -> &Index {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_backend::MemoryBackend;

    const VALID_YAML: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\nspec: {}\n";

    async fn store() -> (ManifestStore, mpsc::Receiver<ManifestKey>) {
        ManifestStore::open(Arc::new(MemoryBackend::new())).await.unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (store, _rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        store.create(key.clone(), VALID_YAML.to_string()).await.unwrap();
        let got = store.get(&key).await.unwrap().unwrap();
        assert_eq!(got.yaml_bytes, VALID_YAML);
        assert_eq!(got.revision, 1);
    }

    #[tokio::test]
    async fn create_twice_fails_already_exists() {
        let (store, _rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        store.create(key.clone(), VALID_YAML.to_string()).await.unwrap();
        let err = store.create(key, VALID_YAML.to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn update_absent_key_fails_not_found() {
        let (store, _rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        let err = store.update(&key, VALID_YAML.to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_bumps_revision() {
        let (store, _rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        store.create(key.clone(), VALID_YAML.to_string()).await.unwrap();
        let updated = store.update(&key, VALID_YAML.to_string()).await.unwrap();
        assert_eq!(updated.revision, 2);
    }

    #[tokio::test]
    async fn delete_absent_key_fails_not_found() {
        let (store, _rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        let err = store.delete(&key).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_then_delete_leaves_index_size_unchanged() {
        let (store, _rx) = store().await;
        let before = store.index().len().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        store.create(key.clone(), VALID_YAML.to_string()).await.unwrap();
        store.delete(&key).await.unwrap();
        assert_eq!(store.index().len().await, before);
    }

    #[tokio::test]
    async fn create_rejects_structurally_invalid_yaml() {
        let (store, _rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        let err = store.create(key, "invalid: yaml: [".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn list_is_lexicographically_ordered_by_key() {
        let (store, _rx) = store().await;
        for name in ["charlie", "alpha", "bravo"] {
            let key = ManifestKey::new("default", "Service", name).unwrap();
            store.create(key, VALID_YAML.to_string()).await.unwrap();
        }
        let keys: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.key.to_string()).collect();
        assert_eq!(
            keys,
            vec!["default/Service/alpha", "default/Service/bravo", "default/Service/charlie"]
        );
    }

    #[tokio::test]
    async fn create_sends_a_reconcile_notification() {
        let (store, mut rx) = store().await;
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        store.create(key.clone(), VALID_YAML.to_string()).await.unwrap();
        assert_eq!(rx.recv().await, Some(key));
    }

    #[tokio::test]
    async fn reopen_rebuilds_index_from_scan() {
        let backend = Arc::new(MemoryBackend::new());
        let key = ManifestKey::parse("default/Service/svc").unwrap();
        {
            let (store, _rx) = ManifestStore::open(backend.clone()).await.unwrap();
            store.create(key.clone(), VALID_YAML.to_string()).await.unwrap();
        }
        let (store, _rx) = ManifestStore::open(backend).await.unwrap();
        assert_eq!(store.index().by_kind("Service").await, vec![key]);
    }
}
