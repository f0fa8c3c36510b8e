use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use controller_domain::{ParameterInstance, Value};
use controller_overlay::merge_schema_with_instance;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

const PARAMETER_NAMESPACE: &str = "default";
const DEFAULT_INSTANCE: &str = "default";

/// `GET /api/parameters`, `GET /api/parameters/instances` — both list the
/// parameter instances tracked in the one namespace this façade manages.
pub async fn list_instances(State(state): State<AppState>) -> Result<Json<Vec<ParameterInstance>>, ApiError> {
    Ok(Json(state.parameters.list(PARAMETER_NAMESPACE).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateInstanceBody {
    pub name: Option<String>,
    #[serde(default = "Value::object")]
    pub spec: Value,
}

/// `POST /api/parameters`, `POST /api/parameters/instances`. Name is
/// optional — when omitted, the instance is created lazily under the
/// smallest unused `config-N` name (§3 "Lifecycle").
pub async fn create_instance(
    State(state): State<AppState>,
    body: Option<Json<CreateInstanceBody>>,
) -> Result<(StatusCode, Json<ParameterInstance>), ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let name = match body.name {
        Some(name) => name,
        None => {
            let existing = state.parameters.list(PARAMETER_NAMESPACE).await?;
            let names: Vec<String> = existing.into_iter().map(|i| i.name).collect();
            ParameterInstance::next_config_name(&names)
        }
    };
    let instance = state.parameters.create_with_spec(&name, PARAMETER_NAMESPACE, body.spec).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// `GET /api/parameters/schema`: the deployed CRD's OpenAPI schema, or the
/// bundled sample schema when the CRD isn't installed/reachable.
pub async fn schema(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.parameters.get_crd_schema().await {
        Ok(schema) => Ok(Json(schema)),
        Err(_) => {
            let sample = controller_config::bundled_sample_schema()?;
            Ok(Json(sample))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InstanceQuery {
    pub instance: Option<String>,
}

/// `GET /api/parameters/values`: the schema, with the named instance's
/// values overlaid — the display-model builder the parameter editor UI
/// renders (§4.4 `merge_schema_with_instance`, never a reconcile path).
pub async fn values(State(state): State<AppState>, Query(query): Query<InstanceQuery>) -> Result<Json<Value>, ApiError> {
    let instance_name = query.instance.as_deref().unwrap_or(DEFAULT_INSTANCE);
    let schema = match state.parameters.get_crd_schema().await {
        Ok(schema) => schema,
        Err(_) => controller_config::bundled_sample_schema()?,
    };
    let instance_spec = state
        .parameters
        .get_spec(instance_name, PARAMETER_NAMESPACE)
        .await?
        .unwrap_or_else(Value::object);
    Ok(Json(merge_schema_with_instance(&schema, &instance_spec)))
}

/// `GET /api/parameters/{service}`: the named instance's merged value for
/// one service (§4.4 `merge`).
pub async fn for_service(
    State(state): State<AppState>,
    Path(service): Path<String>,
    Query(query): Query<InstanceQuery>,
) -> Result<Json<Value>, ApiError> {
    let instance_name = query.instance.as_deref().unwrap_or(DEFAULT_INSTANCE);
    let spec = state
        .parameters
        .get_spec(instance_name, PARAMETER_NAMESPACE)
        .await?
        .unwrap_or_else(Value::object);
    Ok(Json(controller_overlay::merge(&spec, &service)))
}
