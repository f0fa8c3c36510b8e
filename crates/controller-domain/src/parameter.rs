use serde::{Deserialize, Serialize};

use crate::value::Value;

/// `(name, namespace, spec)`. `spec` recognizes two top-level keys,
/// `global` and `services`; every other key is preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInstance {
    pub name: String,
    pub namespace: String,
    pub spec: Value,
}

impl ParameterInstance {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, spec: Value) -> Self {
        ParameterInstance {
            name: name.into(),
            namespace: namespace.into(),
            spec,
        }
    }

    pub fn global(&self) -> Value {
        self.spec.get("global").cloned().unwrap_or(Value::object())
    }

    pub fn service_overrides(&self, service_name: &str) -> Value {
        self.spec
            .get("services")
            .and_then(|s| s.get(service_name))
            .cloned()
            .unwrap_or(Value::object())
    }

    /// Smallest unused `config-N` (`N >= 1`) among `existing_names`, for
    /// the lazy-creation naming rule.
    pub fn next_config_name(existing_names: &[String]) -> String {
        let mut n: u64 = 1;
        loop {
            let candidate = format!("config-{n}");
            if !existing_names.iter().any(|e| e == &candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_config_name_picks_smallest_unused() {
        let existing = vec!["config-1".to_string(), "config-2".to_string()];
        assert_eq!(ParameterInstance::next_config_name(&existing), "config-3");
    }

    #[test]
    fn next_config_name_fills_gap() {
        let existing = vec!["config-1".to_string(), "config-3".to_string()];
        assert_eq!(ParameterInstance::next_config_name(&existing), "config-2");
    }

    #[test]
    fn global_defaults_to_empty_object_when_absent() {
        let instance = ParameterInstance::new("default", "ns", Value::object());
        assert_eq!(instance.global(), Value::object());
    }
}
