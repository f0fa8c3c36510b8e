use axum::extract::{Path, State};
use axum::Json;
use controller_overlay::derive_service_name;
use controller_status::{discover_services, health_status, installation_status, HealthState};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/services` (§4.6 installation status).
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.manifests.list().await?;
    let status = installation_status(&records);
    Ok(Json(json!(status)))
}

#[derive(Serialize)]
struct HealthEntry {
    service: String,
    status: HealthState,
}

/// `GET /api/services/health` (§4.6 health status).
pub async fn health(State(state): State<AppState>) -> Result<Json<Vec<HealthEntry>>, ApiError> {
    let records = state.manifests.list().await?;
    let endpoints = discover_services(&records);
    let results = health_status(&state.http_client, &endpoints).await;
    Ok(Json(results.into_iter().map(|(service, status)| HealthEntry { service, status }).collect()))
}

#[derive(Serialize)]
struct ServiceDetail {
    service: String,
    namespace: String,
    installed: bool,
    manifests: Vec<String>,
}

/// `GET /api/service/{ns}/{name}`.
pub async fn detail(State(state): State<AppState>, Path((namespace, name)): Path<(String, String)>) -> Result<Json<ServiceDetail>, ApiError> {
    let records = state.manifests.list().await?;
    let matching: Vec<_> = records
        .into_iter()
        .filter(|r| r.key.namespace() == namespace && derive_service_name(r.key.name()) == name)
        .collect();

    if matching.is_empty() {
        return Err(ApiError::not_found(format!("service '{name}' not found in namespace '{namespace}'")));
    }

    let installed = matching.iter().any(|r| matches!(r.key.kind(), "Deployment" | "StatefulSet"));
    let manifests = matching.iter().map(|r| r.key.to_string()).collect();
    Ok(Json(ServiceDetail { service: name, namespace, installed, manifests }))
}
