use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use controller_store::EventFilter;
use serde::Serialize;

use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
struct ComponentStatus {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    components: ReadyComponents,
}

#[derive(Serialize)]
struct ReadyComponents {
    database: ComponentStatus,
    manager: ComponentStatus,
    #[serde(rename = "eventStore")]
    event_store: ComponentStatus,
}

/// §6 `GET /readyz`: enumerates `database|manager|eventStore`, 200 when
/// every component is healthy/ready, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> Response {
    let database = match state.manifests.list().await {
        Ok(_) => "healthy",
        Err(_) => "unavailable",
    };
    let manager = if state.reconciler.is_ready() { "ready" } else { "not_ready" };
    let event_store = match state.events.list_events(&EventFilter::default()).await {
        Ok(_) => "healthy",
        Err(_) => "unavailable",
    };

    let all_ready = database == "healthy" && manager == "ready" && event_store == "healthy";
    let body = ReadyBody {
        status: if all_ready { "ready" } else { "not_ready" },
        components: ReadyComponents {
            database: ComponentStatus { status: database },
            manager: ComponentStatus { status: manager },
            event_store: ComponentStatus { status: event_store },
        },
    };
    let code = if all_ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthz_is_always_200() {
        assert_eq!(healthz().await, StatusCode::OK);
    }
}
