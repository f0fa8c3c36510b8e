use std::sync::{Arc, Mutex};
use std::time::Duration;

use controller_domain::ManifestRecord;
use serde::Serialize;

const HEALTH_PATHS: &[&str] = &["/health", "/healthz", "/readyz"];
const DEFAULT_OVERALL_DEADLINE: Duration = Duration::from_secs(5);
const DEFAULT_PER_PROBE_DEADLINE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Unknown,
}

/// A `kind: Service` manifest parsed enough to probe it (§4.6 health
/// status): name/namespace from its key, port from `spec.ports[0].port`.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub name: String,
    pub namespace: String,
    pub port: u16,
}

/// Parses every `kind: Service` manifest into a probeable [`ServiceEndpoint`];
/// services with no `spec.ports` entry can't be probed and are skipped —
/// they never appear in [`health_status`]'s output.
pub fn discover_services(manifests: &[ManifestRecord]) -> Vec<ServiceEndpoint> {
    manifests
        .iter()
        .filter(|r| r.key.kind() == "Service")
        .filter_map(service_endpoint)
        .collect()
}

fn service_endpoint(record: &ManifestRecord) -> Option<ServiceEndpoint> {
    let doc: serde_yaml::Value = serde_yaml::from_str(&record.yaml_bytes).ok()?;
    let port = doc.get("spec")?.get("ports")?.as_sequence()?.first()?.get("port")?.as_u64()? as u16;
    Some(ServiceEndpoint {
        name: record.key.name().to_string(),
        namespace: record.key.namespace().to_string(),
        port,
    })
}

/// Scatter-gather health probe fan-out (§4.6) with the default 5s overall
/// / 2s per-probe deadlines.
pub async fn health_status(client: &reqwest::Client, services: &[ServiceEndpoint]) -> Vec<(String, HealthState)> {
    health_status_with_deadlines(client, services, DEFAULT_OVERALL_DEADLINE, DEFAULT_PER_PROBE_DEADLINE).await
}

/// Same as [`health_status`] with caller-supplied deadlines, for tests and
/// for an operator who wants tighter/looser SLAs than the defaults.
///
/// Ordering guarantee: the returned `Vec` mirrors `services`'s order —
/// each probe writes into a pre-sized slot by index rather than the order
/// in which it completes. Probes run concurrently via `tokio::spawn`; a
/// probe whose own deadline elapses reports `Unknown`, and any probe
/// still in flight when the overall deadline elapses is also `Unknown`
/// (its task keeps running in the background but its result is never
/// observed).
pub async fn health_status_with_deadlines(
    client: &reqwest::Client,
    services: &[ServiceEndpoint],
    overall_deadline: Duration,
    per_probe_deadline: Duration,
) -> Vec<(String, HealthState)> {
    let slots: Arc<Mutex<Vec<Option<HealthState>>>> = Arc::new(Mutex::new(vec![None; services.len()]));

    let mut handles = Vec::with_capacity(services.len());
    for (i, svc) in services.iter().enumerate() {
        let client = client.clone();
        let svc = svc.clone();
        let slots = slots.clone();
        handles.push(tokio::spawn(async move {
            let state = match tokio::time::timeout(per_probe_deadline, probe_one(&client, &svc)).await {
                Ok(state) => state,
                Err(_) => HealthState::Unknown,
            };
            slots.lock().unwrap()[i] = Some(state);
        }));
    }

    let join_remaining = async {
        for handle in handles {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(overall_deadline, join_remaining).await.is_err() {
        tracing::warn!("status aggregation overall deadline exceeded, remaining probes report unknown");
    }

    let slots = slots.lock().unwrap();
    services
        .iter()
        .enumerate()
        .map(|(i, svc)| (svc.name.clone(), slots[i].unwrap_or(HealthState::Unknown)))
        .collect()
}

async fn probe_one(client: &reqwest::Client, svc: &ServiceEndpoint) -> HealthState {
    let host = format!("{}.{}.svc.cluster.local", svc.name, svc.namespace);
    for path in HEALTH_PATHS {
        let url = format!("http://{host}:{}{path}", svc.port);
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return HealthState::Healthy;
            }
        }
    }
    HealthState::Unhealthy
}

#[cfg(test)]
mod tests {
    use super::*;
    use controller_domain::ManifestKey;

    fn service_record(key: &str, port: u16) -> ManifestRecord {
        let yaml = format!(
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\nspec:\n  ports:\n    - port: {port}\n"
        );
        ManifestRecord::new(ManifestKey::parse(key).unwrap(), yaml)
    }

    #[test]
    fn discover_services_parses_port_from_spec() {
        let manifests = vec![service_record("default/Service/payments", 8080)];
        let services = discover_services(&manifests);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].port, 8080);
        assert_eq!(services[0].namespace, "default");
    }

    #[test]
    fn discover_services_skips_services_without_ports() {
        let yaml = "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\nspec: {}\n";
        let record = ManifestRecord::new(ManifestKey::parse("default/Service/payments").unwrap(), yaml.to_string());
        assert!(discover_services(&[record]).is_empty());
    }

    #[tokio::test]
    async fn unreachable_service_is_reported_unhealthy_not_unknown() {
        let client = reqwest::Client::new();
        let services = vec![ServiceEndpoint {
            name: "payments".into(),
            namespace: "default".into(),
            port: 1,
        }];
        let results = health_status_with_deadlines(&client, &services, Duration::from_millis(200), Duration::from_millis(100)).await;
        assert_eq!(results, vec![("payments".to_string(), HealthState::Unhealthy)]);
    }

    #[tokio::test]
    async fn output_order_matches_input_order() {
        let client = reqwest::Client::new();
        let services = vec![
            ServiceEndpoint { name: "b".into(), namespace: "default".into(), port: 1 },
            ServiceEndpoint { name: "a".into(), namespace: "default".into(), port: 1 },
        ];
        let results = health_status_with_deadlines(&client, &services, Duration::from_millis(200), Duration::from_millis(100)).await;
        assert_eq!(results.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn empty_service_list_returns_empty_result() {
        let client = reqwest::Client::new();
        let results = health_status(&client, &[]).await;
        assert!(results.is_empty());
    }
}
