use std::sync::Arc;

use controller_overlay::ParameterClient;
use controller_reconciler::{ReconcileError, Reconciler};
use controller_store::{EventStore, ManifestStore};

use crate::error::ApiError;

/// Shared façade state (§9 "Manifest Store and Event Store are
/// process-wide singletons"): every handler borrows these, nothing is
/// reopened per request.
#[derive(Clone)]
pub struct AppState {
    pub manifests: ManifestStore,
    pub events: EventStore,
    pub reconciler: Arc<Reconciler>,
    pub parameters: Arc<dyn ParameterClient>,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// §4.5 "the façade refuses mutating requests" while the reconciler
    /// hasn't completed its initial cache sync. Every route that mutates
    /// manifests or dispatches a reconcile batch calls this first.
    pub fn ensure_reconciler_ready(&self) -> Result<(), ApiError> {
        if self.reconciler.is_ready() {
            Ok(())
        } else {
            Err(ReconcileError::NotReady.into())
        }
    }
}
