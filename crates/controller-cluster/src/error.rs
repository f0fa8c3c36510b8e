use thiserror::Error;

/// The cluster client's failure modes, classified so the Reconciler can
/// tell transient (retry-eligible) apart from permanent errors (§4.5,
/// §7): `Transient` is anything that looks like a network/apiserver
/// hiccup, `Invalid`/`Forbidden` are never retried.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("transient cluster error: {0}")]
    Transient(String),

    #[error("invalid resource: {0}")]
    Invalid(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("client setup failed: {0}")]
    ClientSetup(String),
}

impl ClusterError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ClusterError::Transient(_))
    }

    pub(crate) fn from_kube(e: kube::Error) -> Self {
        match &e {
            kube::Error::Api(resp) if resp.code == 404 => ClusterError::NotFound(resp.message.clone()),
            kube::Error::Api(resp) if resp.code == 403 => ClusterError::Forbidden(resp.message.clone()),
            kube::Error::Api(resp) if resp.code == 400 || resp.code == 422 => {
                ClusterError::Invalid(resp.message.clone())
            }
            _ => ClusterError::Transient(e.to_string()),
        }
    }
}
