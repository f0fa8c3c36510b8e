use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// `{error: <code>, message?}` (§6/§7): `code` is one of the taxonomy
/// strings, `message` the human-readable cause. Classified by matching on
/// the upstream error enum's variants, never by string matching, per the
/// §7 propagation rule.
pub struct ApiError {
    pub code: &'static str,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        ApiError { code, status, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new("not_found", StatusCode::NOT_FOUND, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        ApiError::new("validation_error", StatusCode::CONFLICT, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::new("invalid_request", StatusCode::BAD_REQUEST, message)
    }

    pub fn missing_parameter(message: impl Into<String>) -> Self {
        ApiError::new("missing_parameter", StatusCode::BAD_REQUEST, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::new("storage_error", StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn kubernetes(message: impl Into<String>) -> Self {
        ApiError::new("kubernetes_error", StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn reconciliation(message: impl Into<String>) -> Self {
        ApiError::new("reconciliation_error", StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn event_store_unavailable(message: impl Into<String>) -> Self {
        ApiError::new("event_store_unavailable", StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn reconciler_unavailable(message: impl Into<String>) -> Self {
        ApiError::new("reconciler_unavailable", StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.code, "message": self.message }));
        (self.status, body).into_response()
    }
}

impl From<controller_domain::DomainError> for ApiError {
    fn from(e: controller_domain::DomainError) -> Self {
        use controller_domain::DomainError::*;
        match &e {
            InvalidYaml(_) => ApiError::new("invalid_yaml", StatusCode::BAD_REQUEST, e.to_string()),
            InvalidServiceName(_) => ApiError::new("invalid_service_name", StatusCode::BAD_REQUEST, e.to_string()),
            InvalidParameter(_) => ApiError::new("invalid_parameter", StatusCode::BAD_REQUEST, e.to_string()),
            InvalidManifestKey(_) | ManifestKeyTooLong | MissingField(_) => {
                ApiError::new("validation_error", StatusCode::BAD_REQUEST, e.to_string())
            }
        }
    }
}

impl From<controller_store::StoreError> for ApiError {
    fn from(e: controller_store::StoreError) -> Self {
        use controller_store::StoreError::*;
        match e {
            NotFound(msg) => ApiError::not_found(msg),
            AlreadyExists(msg) => ApiError::already_exists(msg),
            Invalid(domain_err) => domain_err.into(),
            other => ApiError::storage(other.to_string()),
        }
    }
}

impl From<controller_overlay::OverlayError> for ApiError {
    fn from(e: controller_overlay::OverlayError) -> Self {
        use controller_overlay::OverlayError::*;
        match e {
            NotFound(msg) => ApiError::not_found(msg),
            Domain(domain_err) => domain_err.into(),
            other => ApiError::storage(other.to_string()),
        }
    }
}

impl From<controller_reconciler::ReconcileError> for ApiError {
    fn from(e: controller_reconciler::ReconcileError) -> Self {
        use controller_reconciler::ReconcileError::*;
        match e {
            NotReady => ApiError::reconciler_unavailable(e.to_string()),
            Batch { .. } => ApiError::reconciliation(e.to_string()),
            Cluster(cluster_err) => ApiError::kubernetes(cluster_err.to_string()),
            Store(store_err) => store_err.into(),
            Domain(domain_err) => domain_err.into(),
            Config(config_err) => ApiError::storage(config_err.to_string()),
        }
    }
}

impl From<controller_config::ConfigError> for ApiError {
    fn from(e: controller_config::ConfigError) -> Self {
        ApiError::storage(e.to_string())
    }
}
