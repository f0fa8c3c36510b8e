use serde::{Deserialize, Serialize};

use crate::manifest::ManifestKey;

/// An enqueued reconcile notification carrying no body; the reconciler
/// resolves it by reading the current Store state for `key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileIntent {
    pub key: ManifestKey,
}

impl ReconcileIntent {
    pub fn new(key: ManifestKey) -> Self {
        ReconcileIntent { key }
    }
}
