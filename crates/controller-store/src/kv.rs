use async_trait::async_trait;

use crate::error::StoreError;

/// The logical namespaces multiplexed onto the single on-disk KV file
/// (§6 "Persisted state layout" — `manifests/*`, `events/*`, `meta/*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Manifests,
    Events,
    Meta,
}

/// Durable ordered map with atomic put/get/delete and prefix scan — the
/// KV Backend leaf component. Both implementations order keys
/// lexicographically by raw bytes, which is what gives the Manifest
/// Store's `List()` its "lexicographically ordered by key" guarantee for
/// free.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    async fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    async fn put(&self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Returns whether the key was present before the delete.
    async fn delete(&self, table: Table, key: &[u8]) -> Result<bool, StoreError>;

    /// All entries in `table` in ascending key order.
    async fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Atomically increments and returns the named counter (used for
    /// Event ids). Starts at 1.
    async fn next_seq(&self, counter: &str) -> Result<u64, StoreError>;
}
