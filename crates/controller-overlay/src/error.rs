use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("kube error: {0}")]
    Kube(#[from] kube::Error),

    #[error("domain error: {0}")]
    Domain(#[from] controller_domain::DomainError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
