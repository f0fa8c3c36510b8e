use thiserror::Error;

/// Errors raised while constructing or validating domain values.
///
/// These never carry cluster or storage causes — those are layered on at
/// the crates that own that I/O. `DomainError` is pure-function territory.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid manifest key: {0}")]
    InvalidManifestKey(String),

    #[error("manifest key exceeds 512 bytes")]
    ManifestKeyTooLong,

    #[error("invalid yaml: {0}")]
    InvalidYaml(String),

    #[error("manifest is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid service name: {0}")]
    InvalidServiceName(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
