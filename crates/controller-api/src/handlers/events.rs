use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use controller_domain::{Event, ManifestKey};
use controller_store::EventFilter;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// `GET /api/events`.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Json<Vec<Event>>, ApiError> {
    let filter = EventFilter {
        limit: Some(query.limit.unwrap_or(DEFAULT_LIMIT)),
        offset: query.offset.unwrap_or(0),
        ..Default::default()
    };
    Ok(Json(state.events.list_events(&filter).await?))
}

/// `GET /api/events/errors`.
pub async fn errors(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Json<Vec<Event>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(state.events.get_recent_errors(limit).await?))
}

/// `GET /api/events/{resourceKey}`.
pub async fn by_resource(
    State(state): State<AppState>,
    Path(resource_key): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let key = ManifestKey::parse(resource_key)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(state.events.get_by_resource(&key, limit).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct CleanupQuery {
    pub before: Option<String>,
}

/// `DELETE /api/events?before=RFC3339` (§8 scenario 6: `before` is
/// mandatory — its absence is `missing_parameter`, not a default).
pub async fn cleanup(State(state): State<AppState>, Query(query): Query<CleanupQuery>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let before = query.before.ok_or_else(|| ApiError::missing_parameter("query parameter 'before' is required"))?;
    let before: DateTime<Utc> = before
        .parse()
        .map_err(|_| ApiError::invalid_request(format!("'{before}' is not a valid RFC3339 timestamp")))?;
    let removed = state.events.cleanup_old_events(before).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Events cleaned up successfully", "removed": removed }))))
}
