use std::collections::BTreeMap;

use controller_domain::{ManifestKey, Value};

/// Suffixes trimmed from a manifest's `name` segment to derive its owning
/// service name. At most one is trimmed per key (§4.4, §9 open question
/// #1): sorted longest-first so `-secrets`/`-backend` win over the
/// shorter `-config`/`-pvc` when a name could match more than one.
const SUFFIXES: &[&str] = &["-backend", "-secrets", "-config", "-pvc"];

/// Derives the service name a manifest belongs to by trimming at most one
/// recognized suffix from its `name` segment.
pub fn derive_service_name(name: &str) -> String {
    let mut suffixes: Vec<&str> = SUFFIXES.to_vec();
    suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for suffix in suffixes {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    name.to_string()
}

/// `merge(spec, service_name)`: `spec.global` as a shallow base, each key
/// overwritten by the same-named key in `spec.services[service_name]` if
/// present. No recursive merge at this level. `{}` when `spec` is absent.
pub fn merge(spec: &Value, service_name: &str) -> Value {
    if spec.is_null() {
        return Value::object();
    }
    let global = spec.get("global").cloned().unwrap_or_else(Value::object);
    match spec.get("services").and_then(|s| s.get(service_name)) {
        Some(overrides) => global.shallow_merge(overrides),
        None => global,
    }
}

fn target_namespace(spec: &Value, service_name: &str) -> String {
    spec.get("services")
        .and_then(|s| s.get(service_name))
        .and_then(|o| o.get("namespace"))
        .and_then(|v| v.as_str())
        .or_else(|| spec.get("global").and_then(|g| g.get("namespace")).and_then(|v| v.as_str()))
        .unwrap_or("default")
        .to_string()
}

/// Sets `metadata.namespace` on a parsed manifest and re-serializes it.
/// Returns `None` (pass-through, per §4.4) when the document doesn't parse
/// to a mapping with a `metadata` mapping.
fn rewrite_namespace(yaml_bytes: &str, namespace: &str) -> Option<String> {
    let mut doc: serde_yaml::Value = serde_yaml::from_str(yaml_bytes).ok()?;
    let mapping = doc.as_mapping_mut()?;
    let metadata = mapping.get_mut("metadata")?.as_mapping_mut()?;
    metadata.insert(
        serde_yaml::Value::String("namespace".to_string()),
        serde_yaml::Value::String(namespace.to_string()),
    );
    serde_yaml::to_string(&doc).ok()
}

/// `rewrite_manifests(manifests, spec)`: groups keys by derived service
/// name, resolves each service's `target_namespace`, sets
/// `metadata.namespace` on every manifest in that service, and re-keys
/// the record when the namespace actually changed. Unparseable manifests
/// pass through unchanged, keeping their original key.
pub fn rewrite_manifests(manifests: &BTreeMap<ManifestKey, String>, spec: &Value) -> BTreeMap<ManifestKey, String> {
    let mut by_service: BTreeMap<String, Vec<&ManifestKey>> = BTreeMap::new();
    for key in manifests.keys() {
        by_service.entry(derive_service_name(key.name())).or_default().push(key);
    }

    let mut out = BTreeMap::new();
    for (service_name, keys) in by_service {
        let namespace = target_namespace(spec, &service_name);
        for key in keys {
            let yaml_bytes = &manifests[key];
            match rewrite_namespace(yaml_bytes, &namespace) {
                Some(rewritten) => {
                    let new_key = if namespace != key.namespace() {
                        key.with_namespace(&namespace).unwrap_or_else(|_| key.clone())
                    } else {
                        key.clone()
                    };
                    out.insert(new_key, rewritten);
                }
                None => {
                    out.insert(key.clone(), yaml_bytes.clone());
                }
            }
        }
    }
    out
}

/// Display-model builder for the UI's parameter editor: deep-copies the
/// schema's `global` subtree and overlays the instance's `global` values
/// on top; for `services`, the schema's `services` subtree is treated as
/// a template and applied per service instance. Never on a reconcile
/// path — purely presentational.
pub fn merge_schema_with_instance(schema: &Value, instance: &Value) -> Value {
    let mut out = BTreeMap::new();

    let schema_global = schema.get("global").cloned().unwrap_or_else(Value::object);
    let instance_global = instance.get("global").cloned().unwrap_or_else(Value::object);
    out.insert("global".to_string(), schema_global.recursive_merge(&instance_global));

    let template = schema.get("services").cloned().unwrap_or_else(Value::object);
    let instance_services = instance.get("services").cloned().unwrap_or_else(Value::object);
    let mut services = BTreeMap::new();
    if let Some(instances) = instance_services.as_object() {
        for (service_name, overrides) in instances {
            services.insert(service_name.clone(), template.recursive_merge(overrides));
        }
    }
    out.insert("services".to_string(), Value::Object(services));

    Value::Object(out)
}

/// Recursive overlay adding `description` fields where `target` lacks
/// them, descending only through `properties` and `items` — the schema
/// tree's own structural keys.
pub fn merge_descriptions(target: &Value, donor: &Value) -> Value {
    let (target_map, donor_map) = match (target.as_object(), donor.as_object()) {
        (Some(t), Some(d)) => (t, d),
        _ => return target.clone(),
    };

    let mut merged = target_map.clone();
    if !merged.contains_key("description") {
        if let Some(desc) = donor_map.get("description") {
            merged.insert("description".to_string(), desc.clone());
        }
    }

    for key in ["properties", "items"] {
        if let (Some(t_sub), Some(d_sub)) = (target_map.get(key), donor_map.get(key)) {
            merged.insert(key.to_string(), merge_description_container(t_sub, d_sub));
        }
    }

    Value::Object(merged)
}

fn merge_description_container(target: &Value, donor: &Value) -> Value {
    match (target, donor) {
        (Value::Object(t), Value::Object(d)) => {
            let merged = t
                .iter()
                .map(|(k, v)| {
                    let next = match d.get(k) {
                        Some(donor_v) => merge_descriptions(v, donor_v),
                        None => v.clone(),
                    };
                    (k.clone(), next)
                })
                .collect();
            Value::Object(merged)
        }
        (Value::List(t), Value::List(d)) => {
            let merged = t
                .iter()
                .enumerate()
                .map(|(i, v)| match d.get(i) {
                    Some(donor_v) => merge_descriptions(v, donor_v),
                    None => v.clone(),
                })
                .collect();
            Value::List(merged)
        }
        _ => target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: &[(&str, Value)]) -> Value {
        Value::Object(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    fn spec_with(global: Value, services: Value) -> Value {
        obj(&[("global", global), ("services", services)])
    }

    #[test]
    fn derive_service_name_trims_longest_suffix_first() {
        assert_eq!(derive_service_name("payments-backend"), "payments");
        assert_eq!(derive_service_name("payments-secrets"), "payments");
        assert_eq!(derive_service_name("payments-config"), "payments");
        assert_eq!(derive_service_name("payments-pvc"), "payments");
        assert_eq!(derive_service_name("payments"), "payments");
    }

    #[test]
    fn derive_service_name_trims_at_most_one_suffix() {
        // only the first recognized suffix from the right is trimmed, not
        // both `-pvc` and `-config`.
        assert_eq!(derive_service_name("payments-pvc-config"), "payments-pvc");
    }

    #[test]
    fn merge_prefers_service_override_over_global() {
        let spec = spec_with(
            obj(&[("x", Value::Number(1.0)), ("y", Value::Number(2.0))]),
            obj(&[("payments", obj(&[("x", Value::Number(99.0))]))]),
        );
        let merged = merge(&spec, "payments");
        assert_eq!(merged.get("x"), Some(&Value::Number(99.0)));
        assert_eq!(merged.get("y"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn merge_returns_empty_object_for_absent_spec() {
        assert_eq!(merge(&Value::Null, "payments"), Value::object());
    }

    #[test]
    fn merge_is_not_recursive() {
        let spec = spec_with(
            obj(&[("nested", obj(&[("a", Value::Number(1.0))]))]),
            obj(&[("payments", obj(&[("nested", obj(&[("b", Value::Number(2.0))]))]))]),
        );
        let merged = merge(&spec, "payments");
        // the whole `nested` object is replaced wholesale, `a` is gone.
        assert_eq!(merged.get("nested"), Some(&obj(&[("b", Value::Number(2.0))])));
    }

    #[test]
    fn rewrite_manifests_sets_namespace_and_rekeys() {
        let key = ManifestKey::parse("default/Service/payments-backend").unwrap();
        let yaml = "apiVersion: v1\nkind: Service\nmetadata:\n  name: payments-backend\n  namespace: default\nspec: {}\n";
        let mut manifests = BTreeMap::new();
        manifests.insert(key, yaml.to_string());

        let spec = spec_with(obj(&[("namespace", Value::String("test-ns".into()))]), Value::object());
        let rewritten = rewrite_manifests(&manifests, &spec);

        let new_key = ManifestKey::parse("test-ns/Service/payments-backend").unwrap();
        let body = rewritten.get(&new_key).expect("re-keyed into target namespace");
        assert!(body.contains("namespace: test-ns"));
    }

    #[test]
    fn rewrite_manifests_passes_through_unparseable_yaml() {
        let key = ManifestKey::parse("default/Service/broken").unwrap();
        let mut manifests = BTreeMap::new();
        manifests.insert(key.clone(), "not: valid: yaml: [".to_string());

        let spec = spec_with(obj(&[("namespace", Value::String("test-ns".into()))]), Value::object());
        let rewritten = rewrite_manifests(&manifests, &spec);

        assert_eq!(rewritten.get(&key), manifests.get(&key));
    }

    #[test]
    fn rewrite_manifests_keeps_key_when_namespace_unchanged() {
        let key = ManifestKey::parse("default/Service/payments-backend").unwrap();
        let yaml = "apiVersion: v1\nkind: Service\nmetadata:\n  name: payments-backend\n  namespace: default\nspec: {}\n";
        let mut manifests = BTreeMap::new();
        manifests.insert(key.clone(), yaml.to_string());

        let rewritten = rewrite_manifests(&manifests, &Value::object());
        assert!(rewritten.contains_key(&key));
    }

    #[test]
    fn merge_schema_with_instance_applies_template_per_service() {
        let schema = spec_with(
            obj(&[("namespace", obj(&[("default", Value::String("default".into()))]))]),
            obj(&[("replicas", obj(&[("default", Value::Number(1.0))]))]),
        );
        let instance = spec_with(Value::object(), obj(&[("payments", obj(&[("replicas", Value::Number(3.0))]))]));

        let merged = merge_schema_with_instance(&schema, &instance);
        let payments = merged.get("services").unwrap().get("payments").unwrap();
        assert_eq!(payments.get("replicas"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn merge_descriptions_only_fills_missing_description() {
        let target = obj(&[
            ("type", Value::String("string".into())),
            (
                "properties",
                obj(&[("name", obj(&[("type", Value::String("string".into()))]))]),
            ),
        ]);
        let donor = obj(&[
            ("description", Value::String("top-level".into())),
            (
                "properties",
                obj(&[(
                    "name",
                    obj(&[("description", Value::String("the name".into()))]),
                )]),
            ),
        ]);

        let merged = merge_descriptions(&target, &donor);
        assert_eq!(merged.get("description"), Some(&Value::String("top-level".into())));
        let name_prop = merged.get("properties").unwrap().get("name").unwrap();
        assert_eq!(name_prop.get("description"), Some(&Value::String("the name".into())));
    }

    #[test]
    fn merge_descriptions_never_overwrites_existing_description() {
        let target = obj(&[("description", Value::String("mine".into()))]);
        let donor = obj(&[("description", Value::String("theirs".into()))]);
        let merged = merge_descriptions(&target, &donor);
        assert_eq!(merged.get("description"), Some(&Value::String("mine".into())));
    }
}
