use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Manifest/query routes touch only the local store, so a short deadline
/// is enough to catch a wedged backend without punishing normal callers.
const STORE_ROUTE_TIMEOUT: Duration = Duration::from_secs(10);
/// `/api/up|down|update` fan out to the cluster client across every
/// manifest in the request, so they get the longer of the two deadlines
/// (§5 per-route timeouts).
const RECONCILE_ROUTE_TIMEOUT: Duration = Duration::from_secs(30);

async fn handle_route_timeout(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request exceeded its route deadline".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled error: {err}"))
    }
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .route("/readyz", get(handlers::health::readyz))
}

fn manifest_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/manifests/",
            get(handlers::manifests::list).post(handlers::manifests::create),
        )
        .route(
            "/manifests/*key",
            get(handlers::manifests::get)
                .put(handlers::manifests::update)
                .delete(handlers::manifests::delete),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_route_timeout))
                .timeout(STORE_ROUTE_TIMEOUT),
        )
}

fn reconcile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/up", post(handlers::reconcile::up))
        .route("/api/down", post(handlers::reconcile::down))
        .route("/api/update", post(handlers::reconcile::update))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_route_timeout))
                .timeout(RECONCILE_ROUTE_TIMEOUT),
        )
}

fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/api/services", get(handlers::services::list))
        .route("/api/services/health", get(handlers::services::health))
        .route("/api/service/:namespace/:name", get(handlers::services::detail))
        .route("/api/cluster/requirements", get(handlers::reconcile::cluster_requirements))
        .route(
            "/api/events",
            get(handlers::events::list).delete(handlers::events::cleanup),
        )
        .route("/api/events/errors", get(handlers::events::errors))
        .route("/api/events/*resource_key", get(handlers::events::by_resource))
        .route(
            "/api/parameters",
            get(handlers::parameters::list_instances).post(handlers::parameters::create_instance),
        )
        .route("/api/parameters/schema", get(handlers::parameters::schema))
        .route("/api/parameters/values", get(handlers::parameters::values))
        .route(
            "/api/parameters/instances",
            get(handlers::parameters::list_instances).post(handlers::parameters::create_instance),
        )
        .route("/api/parameters/:service", get(handlers::parameters::for_service))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_route_timeout))
                .timeout(STORE_ROUTE_TIMEOUT),
        )
}

/// Assembles the full §6 route table over `state`. CORS is wide open
/// (`Access-Control-Allow-Origin: *`, any method/header) — this façade
/// sits behind its own auth boundary (out of scope, §1), not CORS.
/// `tower_http`'s `CorsLayer` answers preflight `OPTIONS` itself (204),
/// never reaching a handler.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    health_routes()
        .merge(manifest_routes())
        .merge(reconcile_routes())
        .merge(query_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
