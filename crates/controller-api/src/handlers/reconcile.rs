use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use controller_domain::ManifestRecord;
use controller_overlay::{derive_service_name, rewrite_manifests};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_INSTANCE: &str = "default";
const PARAMETER_NAMESPACE: &str = "default";

#[derive(Debug, Default, Deserialize)]
pub struct ReconcileBody {
    #[serde(default)]
    pub services: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstanceQuery {
    pub instance: Option<String>,
}

#[derive(Serialize)]
pub struct ReconcileSummary {
    pub reconciled: usize,
}

/// Loads every tracked manifest, optionally filtered to `services`, and
/// rewrites them through the named parameter instance's overlay (§4.4)
/// before handing them to the reconciler — the `?instance=` selection and
/// optional `{services:[...]}` body from §6.
async fn selected_manifests(state: &AppState, instance: Option<&str>, services: Option<&[String]>) -> Result<Vec<ManifestRecord>, ApiError> {
    let records = state.manifests.list().await?;

    let filtered: Vec<ManifestRecord> = match services {
        Some(names) => records
            .into_iter()
            .filter(|r| names.iter().any(|n| n == &derive_service_name(r.key.name())))
            .collect(),
        None => records,
    };

    let instance_name = instance.unwrap_or(DEFAULT_INSTANCE);
    let spec = state
        .parameters
        .get_spec(instance_name, PARAMETER_NAMESPACE)
        .await?
        .unwrap_or_else(controller_domain::Value::object);

    let by_key: BTreeMap<_, _> = filtered.iter().map(|r| (r.key.clone(), r.yaml_bytes.clone())).collect();
    let rewritten = rewrite_manifests(&by_key, &spec);

    Ok(filtered
        .into_iter()
        .map(|mut r| {
            if let Some(new_bytes) = rewritten.get(&r.key) {
                r.yaml_bytes = new_bytes.clone();
            }
            r
        })
        .collect())
}

pub async fn up(
    State(state): State<AppState>,
    Query(query): Query<InstanceQuery>,
    body: Option<Json<ReconcileBody>>,
) -> Result<Json<ReconcileSummary>, ApiError> {
    state.ensure_reconciler_ready()?;
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let manifests = selected_manifests(&state, query.instance.as_deref(), body.services.as_deref()).await?;
    let count = manifests.len();
    state.reconciler.deploy_manifests(&manifests).await?;
    Ok(Json(ReconcileSummary { reconciled: count }))
}

pub async fn down(
    State(state): State<AppState>,
    Query(query): Query<InstanceQuery>,
    body: Option<Json<ReconcileBody>>,
) -> Result<Json<ReconcileSummary>, ApiError> {
    state.ensure_reconciler_ready()?;
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let manifests = selected_manifests(&state, query.instance.as_deref(), body.services.as_deref()).await?;
    let count = manifests.len();
    state.reconciler.delete_manifests(&manifests).await?;
    Ok(Json(ReconcileSummary { reconciled: count }))
}

pub async fn update(
    State(state): State<AppState>,
    Query(query): Query<InstanceQuery>,
    body: Option<Json<ReconcileBody>>,
) -> Result<Json<ReconcileSummary>, ApiError> {
    state.ensure_reconciler_ready()?;
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let manifests = selected_manifests(&state, query.instance.as_deref(), body.services.as_deref()).await?;
    let count = manifests.len();
    state.reconciler.update_manifests(&manifests).await?;
    Ok(Json(ReconcileSummary { reconciled: count }))
}

pub async fn cluster_requirements(State(state): State<AppState>) -> Result<Json<controller_reconciler::PreflightReport>, ApiError> {
    let report = controller_reconciler::run_preflight(state.reconciler.cluster_client().as_ref()).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use crate::test_support::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const VALID_YAML: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\nspec: {}\n";

    #[tokio::test]
    async fn up_with_no_manifests_reconciles_zero() {
        let app = build_app(test_state().await);
        let resp = app
            .oneshot(
                Request::post("/api/up")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn up_deploys_tracked_manifests() {
        let state = test_state().await;
        state
            .manifests
            .create(controller_domain::ManifestKey::parse("default/Service/svc").unwrap(), VALID_YAML.to_string())
            .await
            .unwrap();
        let app = build_app(state);
        let resp = app
            .oneshot(
                Request::post("/api/up")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cluster_requirements_returns_200() {
        let app = build_app(test_state().await);
        let resp = app.oneshot(Request::get("/api/cluster/requirements").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn up_refuses_when_reconciler_not_ready() {
        let state = test_state().await;
        state.reconciler.set_ready(false);
        let app = build_app(state);
        let resp = app
            .oneshot(
                Request::post("/api/up")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn down_and_update_also_refuse_when_not_ready() {
        let state = test_state().await;
        state.reconciler.set_ready(false);
        let app = build_app(state);

        let resp = app
            .clone()
            .oneshot(Request::post("/api/down").header("content-type", "application/json").body(Body::from("{}")).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = app
            .oneshot(Request::post("/api/update").header("content-type", "application/json").body(Body::from("{}")).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
