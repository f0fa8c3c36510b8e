use std::collections::BTreeMap;

use controller_domain::ManifestRecord;
use controller_overlay::derive_service_name;

/// `service -> installed` (§4.6): a service is installed once any of its
/// manifests — grouped by the same suffix-trim rule the Overlay Engine
/// uses to derive owning service names — is a primary workload kind.
/// Returned as a `BTreeMap` so callers get a stable, sorted service order
/// without needing to track discovery order themselves.
pub fn installation_status(manifests: &[ManifestRecord]) -> BTreeMap<String, bool> {
    let mut by_service: BTreeMap<String, bool> = BTreeMap::new();
    for record in manifests {
        let service = derive_service_name(record.key.name());
        let is_primary_workload = matches!(record.key.kind(), "Deployment" | "StatefulSet");
        let entry = by_service.entry(service).or_insert(false);
        *entry = *entry || is_primary_workload;
    }
    by_service
}
