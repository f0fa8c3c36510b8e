use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const BUNDLED_PREFLIGHT_YAML: &str = include_str!("bundled/preflight.yaml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreflightChecks {
    pub checks: Vec<PreflightCheckDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreflightCheckDef {
    pub kind: String,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(rename = "checkConfig")]
    pub check_config: CheckConfig,
}

/// The union of fields any single check kind may need; each `PreflightCheckDef::kind`
/// reads only the fields relevant to it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckConfig {
    pub minimum: Option<f64>,
    #[serde(rename = "minimumVersion")]
    pub minimum_version: Option<String>,
    pub name: Option<String>,
}

/// Loads the embedded cluster-preflight-check bundle shipped under the
/// manifest root (§6 "Cluster preflight check configuration").
pub fn load_bundled_preflight_checks() -> Result<PreflightChecks, ConfigError> {
    parse_preflight_checks(BUNDLED_PREFLIGHT_YAML)
}

pub fn parse_preflight_checks(yaml: &str) -> Result<PreflightChecks, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::YamlParse {
        path: "<bundled preflight.yaml>".into(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_preflight_checks_parse() {
        let checks = load_bundled_preflight_checks().unwrap();
        assert!(checks.checks.iter().any(|c| c.kind == "kubernetes-version"));
        assert!(checks.checks.iter().any(|c| c.kind == "node-count"));
        assert!(checks.checks.iter().any(|c| c.kind == "storage-class"));
        assert!(checks.checks.iter().any(|c| c.kind == "cpu"));
        assert!(checks.checks.iter().any(|c| c.kind == "memory"));
    }

    #[test]
    fn required_checks_carry_check_config() {
        let checks = load_bundled_preflight_checks().unwrap();
        let node_count = checks.checks.iter().find(|c| c.kind == "node-count").unwrap();
        assert!(node_count.required);
        assert_eq!(node_count.check_config.minimum, Some(2.0));
    }
}
