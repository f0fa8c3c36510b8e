use kube::core::{ApiResource, GroupVersionKind};

/// Splits `apiVersion` (`"group/version"` or just `"version"` for core)
/// into its group and version parts.
pub fn split_api_version(api_version: &str) -> (String, String) {
    match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

/// Builds an `ApiResource` for a manifest's `(apiVersion, kind)` without a
/// discovery round-trip. Plural derivation is the common English-plural
/// heuristic (`Deployment` -> `deployments`, `Ingress` -> `ingresses`)
/// with the handful of irregular overrides the built-in Kubernetes kinds
/// need; this is a narrow interface's worth of pluralization, not a
/// general solution, and is only reached for kinds this controller is
/// expected to know about.
pub fn api_resource_for(api_version: &str, kind: &str) -> ApiResource {
    let (group, version) = split_api_version(api_version);
    let plural = pluralize(kind);
    let gvk = GroupVersionKind {
        group,
        version,
        kind: kind.to_string(),
    };
    ApiResource::from_gvk_with_plural(&gvk, &plural)
}

fn pluralize(kind: &str) -> String {
    let lower = kind.to_lowercase();
    match lower.as_str() {
        "ingress" => "ingresses".to_string(),
        "endpoints" => "endpoints".to_string(),
        _ if lower.ends_with('s') || lower.ends_with("sh") || lower.ends_with("ch") || lower.ends_with('x') => {
            format!("{lower}es")
        }
        _ if lower.ends_with('y') && !lower.ends_with("ay") && !lower.ends_with("ey") && !lower.ends_with("oy") => {
            format!("{}ies", &lower[..lower.len() - 1])
        }
        _ => format!("{lower}s"),
    }
}
