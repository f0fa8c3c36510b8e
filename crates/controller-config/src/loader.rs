use std::path::Path;

use controller_domain::{validate_manifest_bytes, ManifestKey};
use tracing::debug;

use crate::error::ConfigError;

/// Walks `dir` and loads every `*.yml`/`*.yaml` file found as a manifest
/// seed record, keyed by `<namespace>/<kind>/<name>` (namespace defaults
/// to `default` when `metadata.namespace` is absent).
///
/// Expected layout: a flat or nested directory of manifest files; this is
/// the build-time-embedded manifest library from which a fresh store is
/// seeded at `controller-cli seed` time.
pub fn load_manifest_library(dir: &Path) -> Result<Vec<(ManifestKey, String)>, ConfigError> {
    let mut out = Vec::new();
    collect(dir, &mut out)?;
    Ok(out)
}

fn collect(dir: &Path, out: &mut Vec<(ManifestKey, String)>) -> Result<(), ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            collect(&path, out)?;
            continue;
        }

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "yml" || e == "yaml")
            .unwrap_or(false);
        if !is_yaml {
            continue;
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let mapping = match validate_manifest_bytes(&content) {
            Ok(m) => m,
            Err(e) => {
                debug!("skipping non-manifest file {}: {e}", path.display());
                continue;
            }
        };

        let kind = mapping.get("kind").and_then(|v| v.as_str()).unwrap_or_default();
        let metadata = mapping.get("metadata").and_then(|v| v.as_mapping());
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(|v| v.as_str())
            .unwrap_or("default");

        let key = ManifestKey::new(namespace, kind, name)?;
        debug!("loaded manifest {key} from {}", path.display());
        out.push((key, content));
    }

    Ok(())
}
