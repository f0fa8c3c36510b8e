use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("manifest not found: {0}")]
    NotFound(String),

    #[error("manifest already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid manifest: {0}")]
    Invalid(#[from] controller_domain::DomainError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal store error: {0}")]
    Internal(String),
}
