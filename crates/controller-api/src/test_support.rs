use std::sync::Arc;

use controller_cluster::FakeClusterClient;
use controller_overlay::InMemoryParameterClient;
use controller_reconciler::Reconciler;
use controller_store::{EventStore, ManifestStore, MemoryBackend};

use crate::state::AppState;

/// Builds an [`AppState`] wired entirely to in-memory fakes — no redb file,
/// no real cluster, no real parameter custom resource — for handler tests.
pub async fn test_state() -> AppState {
    let (manifests, _notify) = ManifestStore::open(Arc::new(MemoryBackend::new())).await.unwrap();
    let events = EventStore::new(Arc::new(MemoryBackend::new()));
    let cluster = Arc::new(FakeClusterClient::new());
    let reconciler = Arc::new(Reconciler::new(cluster, events.clone()));
    reconciler.set_ready(true);

    AppState {
        manifests,
        events,
        reconciler,
        parameters: Arc::new(InMemoryParameterClient::new()),
        http_client: reqwest::Client::new(),
    }
}
