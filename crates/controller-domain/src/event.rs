use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::ManifestKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Info => write!(f, "info"),
            EventType::Success => write!(f, "success"),
            EventType::Warning => write!(f, "warning"),
            EventType::Error => write!(f, "error"),
        }
    }
}

/// `(id, timestamp, type, resource_key, source, message, cause?)`.
///
/// Append-only; the only permitted mutation is bulk deletion by age
/// (`CleanupOldEvents`). `id` is assigned by the Event Store and is
/// monotone; `timestamp` defaults to "now" if left zero at `Store` time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub resource_key: ManifestKey,
    pub source: String,
    pub message: String,
    pub cause: Option<String>,
}

impl Event {
    /// Builds an unstamped event (`id = 0`); the Event Store assigns the
    /// real id and, if the timestamp is left at its default, the current
    /// time, at `Store` time.
    pub fn new(event_type: EventType, resource_key: ManifestKey, source: impl Into<String>, message: impl Into<String>) -> Self {
        Event {
            id: 0,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            event_type,
            resource_key,
            source: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}
