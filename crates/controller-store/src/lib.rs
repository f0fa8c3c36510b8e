pub mod error;
pub mod event_store;
pub mod index;
pub mod kv;
pub mod manifest_store;
pub mod memory_backend;
pub mod redb_backend;

pub use error::StoreError;
pub use event_store::{EventFilter, EventStore};
pub use index::Index;
pub use kv::{KvBackend, Table};
pub use manifest_store::ManifestStore;
pub use memory_backend::MemoryBackend;
pub use redb_backend::RedbBackend;
