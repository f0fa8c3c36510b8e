use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use controller_cluster::{ClusterClient, ClusterError};
use controller_domain::{validate_manifest_bytes, Event, EventType, ManifestKey, ManifestRecord};
use controller_store::{EventStore, ManifestStore};
use kube::core::{DynamicObject, ObjectMeta, TypeMeta};
use tracing::{info, warn};

use crate::backoff::{delay_for_attempt, BackoffConfig};
use crate::error::ReconcileError;
use crate::order::kind_rank;
use crate::singleflight::SingleFlight;

const EVENT_SOURCE: &str = "reconciler";

/// Ties the per-key concurrency guard ([`SingleFlight`]), the fixed
/// dependency order ([`order::kind_rank`]), and bounded retry-with-jitter
/// ([`backoff`]) into the §4.5 public contract. One `Reconciler` is shared
/// across every request the façade serves; `readiness` starts false and
/// flips true only once an initial resync has run (`SetReady`/`IsReady`).
pub struct Reconciler {
    cluster: Arc<dyn ClusterClient>,
    events: EventStore,
    single_flight: SingleFlight,
    backoff: BackoffConfig,
    ready: AtomicBool,
}

impl Reconciler {
    pub fn new(cluster: Arc<dyn ClusterClient>, events: EventStore) -> Self {
        Reconciler {
            cluster,
            events,
            single_flight: SingleFlight::new(),
            backoff: BackoffConfig::default(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn cluster_client(&self) -> Arc<dyn ClusterClient> {
        self.cluster.clone()
    }

    /// Applies every manifest in ascending dependency-rank order, one
    /// single-flight-guarded `reconcile_one` per key. Failures accumulate
    /// into a [`ReconcileError::Batch`] rather than aborting the batch.
    pub async fn deploy_manifests(&self, manifests: &[ManifestRecord]) -> Result<(), ReconcileError> {
        self.apply_batch(manifests, false).await
    }

    /// Identical to [`Self::deploy_manifests`] — `apply` is already
    /// create-or-update (§4.5).
    pub async fn update_manifests(&self, manifests: &[ManifestRecord]) -> Result<(), ReconcileError> {
        self.apply_batch(manifests, false).await
    }

    /// Deletes every manifest in descending dependency-rank order (reverse
    /// of deploy); a manifest already absent cluster-side is not an error.
    pub async fn delete_manifests(&self, manifests: &[ManifestRecord]) -> Result<(), ReconcileError> {
        self.apply_batch(manifests, true).await
    }

    /// Deletes every resource named by `manifests` — the caller (the
    /// façade) supplies the full tracked set from the Manifest Store since
    /// the Reconciler itself holds no inventory (§4.5 `DeleteAll`).
    pub async fn delete_all(&self, manifests: &[ManifestRecord]) -> Result<(), ReconcileError> {
        self.delete_manifests(manifests).await
    }

    async fn apply_batch(&self, manifests: &[ManifestRecord], deleting: bool) -> Result<(), ReconcileError> {
        let mut ordered: Vec<&ManifestRecord> = manifests.iter().collect();
        ordered.sort_by_key(|r| kind_rank(r.key.kind()));
        if deleting {
            ordered.reverse();
        }

        let mut failures = Vec::new();
        for record in &ordered {
            let outcome = self
                .single_flight
                .run(&record.key, || self.reconcile_one(record, deleting))
                .await;
            if let Err(e) = outcome {
                failures.push(format!("{}: {e}", record.key));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ReconcileError::Batch {
                total: ordered.len(),
                failed: failures.len(),
                failures,
            })
        }
    }

    /// Applies or deletes a single manifest with bounded retry, emitting
    /// one Event per attempt (§4.5 "every attempt ... emits an Event").
    async fn reconcile_one(&self, record: &ManifestRecord, deleting: bool) -> Result<(), ReconcileError> {
        let mut attempt = 1;
        loop {
            let result = if deleting {
                self.delete_one(record).await
            } else {
                self.apply_one(record).await
            };

            match result {
                Ok(()) => {
                    self.emit(EventType::Success, &record.key, format!("reconciled on attempt {attempt}"), None)
                        .await;
                    return Ok(());
                }
                Err(e) if e.is_transient() && attempt < self.backoff.max_attempts => {
                    self.emit(
                        EventType::Warning,
                        &record.key,
                        format!("transient failure on attempt {attempt}, retrying"),
                        Some(e.to_string()),
                    )
                    .await;
                    let delay = delay_for_attempt(&self.backoff, attempt);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    self.emit(
                        EventType::Error,
                        &record.key,
                        format!("reconcile failed permanently after {attempt} attempt(s)"),
                        Some(e.to_string()),
                    )
                    .await;
                    return Err(ReconcileError::Cluster(e));
                }
            }
        }
    }

    async fn apply_one(&self, record: &ManifestRecord) -> Result<(), ClusterError> {
        let (api_version, kind, object) = manifest_to_dynamic_object(&record.yaml_bytes)
            .map_err(|e| ClusterError::Invalid(e.to_string()))?;
        let namespace = record.key.namespace();
        let namespace = if namespace.is_empty() { None } else { Some(namespace) };
        self.cluster.apply(&api_version, &kind, namespace, object).await
    }

    async fn delete_one(&self, record: &ManifestRecord) -> Result<(), ClusterError> {
        let (api_version, kind, _object) =
            manifest_to_dynamic_object(&record.yaml_bytes).map_err(|e| ClusterError::Invalid(e.to_string()))?;
        let key = &record.key;
        self.cluster.delete(&api_version, &kind, namespace_opt(key), key.name()).await
    }

    async fn emit(&self, event_type: EventType, key: &ManifestKey, message: String, cause: Option<String>) {
        let mut event = Event::new(event_type, key.clone(), EVENT_SOURCE, message);
        if let Some(cause) = cause {
            event = event.with_cause(cause);
        }
        match event_type {
            EventType::Error => warn!(key = %key, "{}", event.message),
            _ => info!(key = %key, "{}", event.message),
        }
        if let Err(e) = self.events.store(event).await {
            warn!("failed to persist reconcile event for {key}: {e}");
        }
    }
}

fn namespace_opt(key: &ManifestKey) -> Option<&str> {
    let ns = key.namespace();
    if ns.is_empty() {
        None
    } else {
        Some(ns)
    }
}

/// Converts stored manifest YAML into the `(apiVersion, kind, DynamicObject)`
/// triple [`ClusterClient::apply`] expects: `apiVersion`/`kind` become the
/// object's [`TypeMeta`], `metadata` becomes [`ObjectMeta`], and every other
/// top-level field (`spec`, `data`, `stringData`, ...) is carried verbatim
/// in `data` since [`DynamicObject`] flattens it back out on serialize.
fn manifest_to_dynamic_object(yaml_bytes: &str) -> Result<(String, String, DynamicObject), controller_domain::DomainError> {
    let mapping = validate_manifest_bytes(yaml_bytes)?;

    let api_version = mapping.get("apiVersion").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let kind = mapping.get("kind").and_then(|v| v.as_str()).unwrap_or_default().to_string();

    let metadata_mapping = mapping.get("metadata").and_then(|v| v.as_mapping()).cloned().unwrap_or_default();
    let metadata_value =
        serde_json::to_value(serde_yaml::Value::Mapping(metadata_mapping)).unwrap_or(serde_json::Value::Null);
    let metadata: ObjectMeta = serde_json::from_value(metadata_value).unwrap_or_default();

    let mut data = BTreeMap::new();
    for (k, v) in &mapping {
        let key = k.as_str().unwrap_or_default();
        if matches!(key, "apiVersion" | "kind" | "metadata") {
            continue;
        }
        let json_value = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
        data.insert(key.to_string(), json_value);
    }

    let object = DynamicObject {
        types: Some(TypeMeta {
            api_version: api_version.clone(),
            kind: kind.clone(),
        }),
        metadata,
        data: serde_json::Value::Object(data.into_iter().collect()),
    };

    Ok((api_version, kind, object))
}
