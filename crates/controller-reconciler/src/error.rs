use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("cluster error: {0}")]
    Cluster(#[from] controller_cluster::ClusterError),

    #[error("store error: {0}")]
    Store(#[from] controller_store::StoreError),

    #[error("domain error: {0}")]
    Domain(#[from] controller_domain::DomainError),

    #[error("config error: {0}")]
    Config(#[from] controller_config::ConfigError),

    #[error("reconciler is not ready")]
    NotReady,

    /// Partial batch failure (§4.5): the batch does not abort on first
    /// error — it accumulates and surfaces an aggregate naming every
    /// failed key, while the successful operations have already
    /// committed cluster-side.
    #[error("reconcile failed for {failed} of {total} manifest(s): {}", .failures.join("; "))]
    Batch {
        total: usize,
        failed: usize,
        failures: Vec<String>,
    },
}
