use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use controller_domain::ManifestKey;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
struct ManifestView {
    key: String,
    value: String,
    revision: u64,
}

impl From<controller_domain::ManifestRecord> for ManifestView {
    fn from(r: controller_domain::ManifestRecord) -> Self {
        ManifestView { key: r.key.to_string(), value: r.yaml_bytes, revision: r.revision }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ManifestView>>, ApiError> {
    let records = state.manifests.list().await?;
    Ok(Json(records.into_iter().map(ManifestView::from).collect()))
}

pub async fn get(State(state): State<AppState>, Path(key): Path<String>) -> Result<Response, ApiError> {
    let key = ManifestKey::parse(key)?;
    let record = state.manifests.get(&key).await?.ok_or_else(|| ApiError::not_found(format!("manifest '{key}' not found")))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/yaml")],
        record.yaml_bytes,
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct CreateBody {
    pub key: String,
    pub value: String,
}

pub async fn create(State(state): State<AppState>, Json(body): Json<CreateBody>) -> Result<Response, ApiError> {
    state.ensure_reconciler_ready()?;
    let key = ManifestKey::parse(body.key)?;
    let record = state.manifests.create(key, body.value).await?;
    Ok((StatusCode::CREATED, Json(ManifestView::from(record))).into_response())
}

#[derive(Deserialize)]
pub struct UpdateBody {
    pub value: String,
}

pub async fn update(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<ManifestView>, ApiError> {
    state.ensure_reconciler_ready()?;
    let key = ManifestKey::parse(key)?;
    let record = state.manifests.update(&key, body.value).await?;
    Ok(Json(ManifestView::from(record)))
}

pub async fn delete(State(state): State<AppState>, Path(key): Path<String>) -> Result<StatusCode, ApiError> {
    state.ensure_reconciler_ready()?;
    let key = ManifestKey::parse(key)?;
    state.manifests.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use crate::test_support::test_state;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const VALID_YAML: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\nspec: {}\n";

    #[tokio::test]
    async fn create_then_list_then_get_round_trips() {
        let app = build_app(test_state().await);

        let body = serde_json::json!({ "key": "default/Service/svc", "value": VALID_YAML });
        let resp = app
            .clone()
            .oneshot(
                Request::post("/manifests/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.clone().oneshot(Request::get("/manifests/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(Request::get("/manifests/default/Service/svc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/yaml");
    }

    #[tokio::test]
    async fn create_with_invalid_yaml_returns_400() {
        let app = build_app(test_state().await);
        let body = serde_json::json!({ "key": "default/Service/svc", "value": "invalid: yaml: [" });
        let resp = app
            .oneshot(
                Request::post("/manifests/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_manifest_returns_404() {
        let app = build_app(test_state().await);
        let resp = app
            .oneshot(Request::get("/manifests/default/Service/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_manifest_returns_404() {
        let app = build_app(test_state().await);
        let resp = app
            .oneshot(Request::delete("/manifests/default/Service/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mutating_routes_refuse_when_reconciler_not_ready() {
        let state = test_state().await;
        state.reconciler.set_ready(false);
        let app = build_app(state);

        let body = serde_json::json!({ "key": "default/Service/svc", "value": VALID_YAML });
        let resp = app
            .clone()
            .oneshot(
                Request::post("/manifests/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = app
            .clone()
            .oneshot(
                Request::put("/manifests/default/Service/svc")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::json!({ "value": VALID_YAML }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = app
            .oneshot(Request::delete("/manifests/default/Service/svc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
