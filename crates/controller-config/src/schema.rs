use controller_domain::Value;

use crate::error::ConfigError;

const BUNDLED_SAMPLE_SCHEMA_YAML: &str = include_str!("bundled/sample_schema.yaml");

/// The Parameter Client's `GetCRDSchema` substitutes this when the real
/// custom-resource-definition schema fetch fails.
pub fn bundled_sample_schema() -> Result<Value, ConfigError> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(BUNDLED_SAMPLE_SCHEMA_YAML).map_err(|e| ConfigError::YamlParse {
            path: "<bundled sample_schema.yaml>".into(),
            source: e,
        })?;
    Ok(Value::from_yaml(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schema_has_global_and_services() {
        let schema = bundled_sample_schema().unwrap();
        assert!(schema.get("global").is_some());
        assert!(schema.get("services").is_some());
    }
}
