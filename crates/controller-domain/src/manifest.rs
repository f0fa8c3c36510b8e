use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MAX_KEY_BYTES: usize = 512;

/// Canonical `<namespace>/<kind>/<name>` identity, shared by the Manifest
/// Store and the Event Store. All three segments are non-empty and
/// segment-safe (no embedded `/`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManifestKey(String);

impl ManifestKey {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.len() > MAX_KEY_BYTES {
            return Err(DomainError::ManifestKeyTooLong);
        }
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(DomainError::InvalidManifestKey(raw));
        }
        Ok(ManifestKey(raw))
    }

    pub fn new(namespace: &str, kind: &str, name: &str) -> Result<Self, DomainError> {
        Self::parse(format!("{namespace}/{kind}/{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.segment(0)
    }

    pub fn kind(&self) -> &str {
        self.segment(1)
    }

    pub fn name(&self) -> &str {
        self.segment(2)
    }

    fn segment(&self, idx: usize) -> &str {
        self.0.splitn(3, '/').nth(idx).unwrap_or_default()
    }

    /// Returns a copy of this key with the namespace segment replaced.
    pub fn with_namespace(&self, namespace: &str) -> Result<Self, DomainError> {
        Self::new(namespace, self.kind(), self.name())
    }
}

impl std::fmt::Display for ManifestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ManifestKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `(key, yaml_bytes, revision, created_at, updated_at)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub key: ManifestKey,
    pub yaml_bytes: String,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManifestRecord {
    pub fn new(key: ManifestKey, yaml_bytes: String) -> Self {
        let now = Utc::now();
        ManifestRecord {
            key,
            yaml_bytes,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn bump(&mut self, yaml_bytes: String) {
        self.yaml_bytes = yaml_bytes;
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}

/// Validates that `yaml_bytes` unmarshals to a mapping carrying non-empty
/// string `apiVersion`, string `kind`, and a mapping `metadata` with a
/// string `name`. Shared by the Manifest Store (`Create`/`Update`) and the
/// Overlay Engine's `rewrite_manifests`.
pub fn validate_manifest_bytes(yaml_bytes: &str) -> Result<serde_yaml::Mapping, DomainError> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(yaml_bytes).map_err(|e| DomainError::InvalidYaml(e.to_string()))?;

    let mapping = doc
        .as_mapping()
        .ok_or_else(|| DomainError::InvalidYaml("document is not a mapping".into()))?
        .clone();

    let api_version = mapping
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    if api_version.is_none() {
        return Err(DomainError::MissingField("apiVersion"));
    }

    let kind = mapping
        .get("kind")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    if kind.is_none() {
        return Err(DomainError::MissingField("kind"));
    }

    let metadata = mapping
        .get("metadata")
        .and_then(|v| v.as_mapping())
        .ok_or(DomainError::MissingField("metadata"))?;

    let name = metadata
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    if name.is_none() {
        return Err(DomainError::MissingField("metadata.name"));
    }

    Ok(mapping)
}
