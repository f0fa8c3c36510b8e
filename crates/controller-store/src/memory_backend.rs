use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::kv::{KvBackend, Table};

#[derive(Debug, Default)]
struct Inner {
    manifests: BTreeMap<Vec<u8>, Vec<u8>>,
    events: BTreeMap<Vec<u8>, Vec<u8>>,
    meta: BTreeMap<Vec<u8>, Vec<u8>>,
    counters: HashMap<String, u64>,
}

impl Inner {
    fn table_mut(&mut self, table: Table) -> &mut BTreeMap<Vec<u8>, Vec<u8>> {
        match table {
            Table::Manifests => &mut self.manifests,
            Table::Events => &mut self.events,
            Table::Meta => &mut self.meta,
        }
    }

    fn table(&self, table: Table) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        match table {
            Table::Manifests => &self.manifests,
            Table::Events => &self.events,
            Table::Meta => &self.meta,
        }
    }
}

/// In-memory implementation of [`KvBackend`]. All data is lost on process
/// exit. Used by tests and ephemeral bootstrap.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.table(table).get(key).cloned())
    }

    async fn put(&self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.table_mut(table).insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, table: Table, key: &[u8]) -> Result<bool, StoreError> {
        let mut guard = self.inner.write().await;
        Ok(guard.table_mut(table).remove(key).is_some())
    }

    async fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .table(table)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn next_seq(&self, counter: &str) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().await;
        let next = guard.counters.get(counter).copied().unwrap_or(0) + 1;
        guard.counters.insert(counter.to_string(), next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let backend = MemoryBackend::new();
        backend.put(Table::Manifests, b"a/Kind/b", b"payload").await.unwrap();
        let got = backend.get(Table::Manifests, b"a/Kind/b").await.unwrap();
        assert_eq!(got, Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn delete_reports_prior_presence() {
        let backend = MemoryBackend::new();
        assert!(!backend.delete(Table::Manifests, b"missing").await.unwrap());
        backend.put(Table::Manifests, b"k", b"v").await.unwrap();
        assert!(backend.delete(Table::Manifests, b"k").await.unwrap());
    }

    #[tokio::test]
    async fn scan_is_lexicographically_ordered() {
        let backend = MemoryBackend::new();
        backend.put(Table::Manifests, b"b", b"2").await.unwrap();
        backend.put(Table::Manifests, b"a", b"1").await.unwrap();
        backend.put(Table::Manifests, b"c", b"3").await.unwrap();
        let all = backend.scan(Table::Manifests).await.unwrap();
        let keys: Vec<_> = all.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[tokio::test]
    async fn next_seq_increments_from_one() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.next_seq("event_seq").await.unwrap(), 1);
        assert_eq!(backend.next_seq("event_seq").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn tables_are_independent() {
        let backend = MemoryBackend::new();
        backend.put(Table::Manifests, b"k", b"manifest").await.unwrap();
        backend.put(Table::Events, b"k", b"event").await.unwrap();
        assert_eq!(backend.get(Table::Manifests, b"k").await.unwrap(), Some(b"manifest".to_vec()));
        assert_eq!(backend.get(Table::Events, b"k").await.unwrap(), Some(b"event".to_vec()));
    }
}
