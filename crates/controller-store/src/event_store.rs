use std::sync::Arc;

use chrono::{DateTime, Utc};
use controller_domain::{Event, EventType, ManifestKey};

use crate::error::StoreError;
use crate::kv::{KvBackend, Table};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub resource_key: Option<ManifestKey>,
    pub event_type: Option<EventType>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl EventFilter {
    fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    fn matches(&self, event: &Event) -> bool {
        if let Some(key) = &self.resource_key {
            if &event.resource_key != key {
                return false;
            }
        }
        if let Some(t) = self.event_type {
            if event.event_type != t {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if event.timestamp >= until {
                return false;
            }
        }
        true
    }
}

/// Append-only typed event log, indexed implicitly by `resource_key` and
/// `timestamp` (both are filterable via [`EventFilter`]; there is no
/// separate on-disk secondary index — result sets are small enough that a
/// full-table scan plus in-memory filter/sort is the correct tradeoff).
#[derive(Clone)]
pub struct EventStore {
    backend: Arc<dyn KvBackend>,
}

impl EventStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        EventStore { backend }
    }

    /// Assigns `id` (and `timestamp` if left at its zero default) and
    /// persists. Write failures surface as [`StoreError`]; an absent
    /// Event Store at boot is a façade-level `event_store_unavailable`
    /// concern (§4.2), not something this type models.
    pub async fn store(&self, mut event: Event) -> Result<Event, StoreError> {
        let id = self.backend.next_seq("event_seq").await?;
        event.id = id;
        if event.timestamp == DateTime::<Utc>::UNIX_EPOCH {
            event.timestamp = Utc::now();
        }
        let bytes = serde_json::to_vec(&event)?;
        self.backend.put(Table::Events, &id.to_be_bytes(), &bytes).await?;
        Ok(event)
    }

    async fn all(&self) -> Result<Vec<Event>, StoreError> {
        let entries = self.backend.scan(Table::Events).await?;
        entries
            .into_iter()
            .map(|(_, v)| serde_json::from_slice(&v).map_err(StoreError::from))
            .collect()
    }

    /// Ordered by `timestamp` descending, then `id` descending.
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self.all().await?.into_iter().filter(|e| filter.matches(e)).collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        let limit = filter.effective_limit();
        Ok(events.into_iter().skip(filter.offset).take(limit).collect())
    }

    pub async fn get_by_resource(&self, key: &ManifestKey, limit: usize) -> Result<Vec<Event>, StoreError> {
        self.list_events(&EventFilter {
            resource_key: Some(key.clone()),
            limit: Some(limit.min(MAX_LIMIT)),
            ..Default::default()
        })
        .await
    }

    pub async fn get_recent_errors(&self, limit: usize) -> Result<Vec<Event>, StoreError> {
        self.list_events(&EventFilter {
            event_type: Some(EventType::Error),
            limit: Some(limit.min(MAX_LIMIT)),
            ..Default::default()
        })
        .await
    }

    /// Bulk delete where `timestamp < before`; returns the number removed.
    pub async fn cleanup_old_events(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let entries = self.backend.scan(Table::Events).await?;
        let mut removed = 0;
        for (k, v) in entries {
            let event: Event = serde_json::from_slice(&v)?;
            if event.timestamp < before {
                self.backend.delete(Table::Events, &k).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
